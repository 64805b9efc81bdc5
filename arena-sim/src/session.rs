use std::collections::HashMap;

use arena_world::EntityId;

/// Per-connection state. `entity` doubles as the
/// session identifier: one player connection owns exactly one entity for the
/// lifetime of the session, and ids are never reused, so a separate session
/// id would be redundant.
pub struct ClientSession {
    pub entity: EntityId,
    pub los_mode: bool,
    pub view_distance: f32,
    pub move_intent: (f32, f32),
    pub yaw: f32,
    pub pitch: f32,
    pub shooting: bool,
    pub last_shot_millis: u64,
    pub grace_map: HashMap<EntityId, u32>,
}

impl ClientSession {
    pub fn new(entity: EntityId, view_distance: f32) -> Self {
        Self {
            entity,
            los_mode: false,
            view_distance,
            move_intent: (0.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            shooting: false,
            last_shot_millis: 0,
            grace_map: HashMap::new(),
        }
    }

    /// Applies the grace window to a freshly computed `visible_now` set,
    /// mutating `grace_map` in place.
    ///
    /// `is_alive` filters entities that have disconnected/despawned since
    /// they last entered the grace map.
    pub fn apply_grace(&mut self, visible_now: &[EntityId], grace_ticks: u32, is_alive: impl Fn(EntityId) -> bool) -> Vec<EntityId> {
        let mut final_set: Vec<EntityId> = visible_now.to_vec();

        for id in visible_now {
            self.grace_map.insert(*id, grace_ticks);
        }

        let mut expired = Vec::new();
        for (id, ticks_remaining) in self.grace_map.iter_mut() {
            if visible_now.contains(id) {
                continue;
            }
            if !is_alive(*id) {
                expired.push(*id);
                continue;
            }
            if *ticks_remaining == 0 {
                expired.push(*id);
                continue;
            }
            *ticks_remaining -= 1;
            final_set.push(*id);
            if *ticks_remaining == 0 {
                expired.push(*id);
            }
        }
        for id in expired {
            self.grace_map.remove(&id);
        }

        final_set
    }
}
