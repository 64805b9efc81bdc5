use std::collections::HashMap;

use arena_math::Vector3;

use crate::bullet::{Bullet, BulletId, HitEvent};
use crate::config::ArenaConfig;
use crate::entity::{Entity, EntityId};
use crate::error::ArenaError;
use crate::grid::SpatialGrid;
use crate::heightmap::feet_height;
use crate::obstacle::Obstacle;

/// Slack added to `terrain_size / 2` before an obstacle is rejected as
/// out-of-bounds, generous enough to admit the world generator's own
/// boundary wall ring (which sits just outside the playable half-extent).
const OUT_OF_BOUNDS_SLACK: f32 = 50.0;

/// Owns everything the tick orchestrator needs exclusive, single-threaded
/// access to: the static obstacle set, the dynamic entity set, the spatial
/// grid binding them together, in-flight bullets, and this tick's hit
/// events. Every other component receives borrowed references scoped to one
/// tick.
pub struct World {
    pub config: ArenaConfig,
    pub obstacles: Vec<Obstacle>,
    pub grid: SpatialGrid,
    entities: HashMap<EntityId, Entity>,
    pub bullets: Vec<Bullet>,
    pub hit_events: Vec<HitEvent>,
    next_bullet_id: BulletId,
}

impl World {
    /// Builds the world from a validated obstacle list. Fails with
    /// [`ArenaError::ObstacleOutOfBounds`] if any obstacle's footprint lies
    /// far enough outside the terrain's half-extent that it could not be a
    /// legitimate boundary wall — this is the one fatal error world
    /// construction can raise (spec: "fatal errors are limited to world
    /// initialisation").
    pub fn new(config: ArenaConfig, obstacles: Vec<Obstacle>) -> Result<Self, ArenaError> {
        let limit = config.terrain_size / 2.0 + OUT_OF_BOUNDS_SLACK;
        for obstacle in &obstacles {
            let aabb = obstacle.aabb();
            let (min, max) = (aabb.min(), aabb.max());
            if min.x < -limit || max.x > limit || min.z < -limit || max.z > limit {
                return Err(ArenaError::ObstacleOutOfBounds(*obstacle));
            }
        }

        let mut grid = SpatialGrid::new(config.cell_size, config.terrain_size);
        for (idx, obstacle) in obstacles.iter().enumerate() {
            grid.insert_obstacle(idx, &obstacle.aabb());
        }
        grid.build_nearby_cache();
        Ok(Self {
            config,
            obstacles,
            grid,
            entities: HashMap::new(),
            bullets: Vec::new(),
            hit_events: Vec::new(),
            next_bullet_id: 0,
        })
    }

    pub fn ground_height_at(&self, x: f32, z: f32) -> f32 {
        crate::heightmap::ground_height(x, z, self.config.tile_size, self.config.height_scale)
    }

    /// `groundHeight(x, z) + 2`, the feet-height convention.
    pub fn feet_height_at(&self, x: f32, z: f32) -> f32 {
        feet_height(x, z, self.config.tile_size, self.config.height_scale)
    }

    /// Insert a new entity, snapping its Y to the feet-height convention and
    /// binning it into the grid.
    pub fn spawn_entity(&mut self, mut entity: Entity) -> EntityId {
        entity.position.y = self.feet_height_at(entity.position.x, entity.position.z);
        let id = entity.id;
        self.grid.move_entity(id, entity.position);
        self.entities.insert(id, entity);
        id
    }

    pub fn remove_entity(&mut self, id: EntityId) {
        self.entities.remove(&id);
        self.grid.remove_entity(id);
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Move an entity to `(x, z)`, snapping Y to the feet-height convention
    /// and keeping the grid's cell membership in sync. Returns `false` if the
    /// entity does not exist.
    pub fn set_entity_xz(&mut self, id: EntityId, x: f32, z: f32) -> bool {
        let y = self.feet_height_at(x, z);
        let Some(entity) = self.entities.get_mut(&id) else { return false };
        entity.position = Vector3::new(x, y, z);
        self.grid.move_entity(id, entity.position);
        true
    }

    /// `collides(x, z) = exists obstacle in nearby cells, solid-for-movement,
    /// whose XZ footprint inflated by `radius` contains the point`.
    pub fn collides_at(&self, x: f32, z: f32, radius: f32) -> bool {
        self.grid.nearby_obstacles(x, z).iter().any(|&idx| {
            let obstacle = &self.obstacles[idx];
            obstacle.kind.is_solid_for_movement() && obstacle.aabb().inflated_xz(radius).contains_xz(x, z)
        })
    }

    pub fn allocate_bullet_id(&mut self) -> BulletId {
        let id = self.next_bullet_id;
        self.next_bullet_id += 1;
        id
    }
}
