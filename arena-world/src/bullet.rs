use arena_math::Vector3;

use crate::entity::EntityId;

pub type BulletId = u64;

/// A projectile owned exclusively by the bullet simulator; no other
/// component holds a reference to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bullet {
    pub id: BulletId,
    pub owner_id: EntityId,
    pub position: Vector3,
    pub direction: Vector3,
    pub speed: f32,
    pub damage: i32,
    pub created_at_millis: u64,
}

impl Bullet {
    pub fn is_expired(&self, now_millis: u64, lifetime_ms: u64) -> bool {
        now_millis.saturating_sub(self.created_at_millis) >= lifetime_ms
    }
}

/// Transient per-tick hit record; cleared at the start of each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitEvent {
    pub position: Vector3,
    pub hit_entity: bool,
    pub entity_id: Option<EntityId>,
}
