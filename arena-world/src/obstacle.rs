use arena_math::{Aabb, Vector3};
use serde::{Deserialize, Serialize};

/// Closed tagged variant for obstacle kinds: solidity and opacity become
/// pure functions of the tag, rather than a stringly-typed kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObstacleKind {
    HouseWall,
    Ruins,
    Fence,
    Tower,
    Crate,
    Barricade,
    Rock,
    Shed,
    Boundary,
    Tree,
    TreeFoliage,
    Hill,
}

impl ObstacleKind {
    /// Whether this kind blocks movement (bots, players, bullets).
    pub fn is_solid_for_movement(self) -> bool {
        matches!(
            self,
            ObstacleKind::HouseWall
                | ObstacleKind::Ruins
                | ObstacleKind::Tower
                | ObstacleKind::Shed
                | ObstacleKind::Crate
                | ObstacleKind::Barricade
                | ObstacleKind::Rock
                | ObstacleKind::Fence
                | ObstacleKind::Boundary
                | ObstacleKind::Tree
        )
    }

    /// Every obstacle kind blocks line of sight, including decorative
    /// foliage boxes that are not solid for movement.
    pub fn is_opaque_for_los(self) -> bool {
        true
    }
}

/// Optional visual decoration the core forwards to clients opaquely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub trunk_radius: Option<f32>,
    pub foliage_radius: Option<f32>,
    pub foliage_color: Option<u32>,
}

/// Immutable-after-load static obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: Vector3,
    pub size: Vector3,
    pub kind: ObstacleKind,
    #[serde(default)]
    pub decoration: Decoration,
}

impl Obstacle {
    pub fn new(center: Vector3, size: Vector3, kind: ObstacleKind) -> Self {
        Self { center, size, kind, decoration: Decoration::default() }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.center, self.size)
    }
}
