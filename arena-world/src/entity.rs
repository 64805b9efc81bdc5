use arena_math::Vector3;

pub type EntityId = u32;

/// A moving game object: bot or player. Ids below `ArenaConfig::PLAYER_ID_BASE`
/// are bots; player ids are assigned starting at `PLAYER_ID_BASE` and never
/// reused within a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vector3,
    /// Reserved; not consulted by movement in this core.
    pub velocity: Vector3,
    pub yaw: f32,
    pub pitch: f32,
    pub is_player: bool,
    pub hp: i32,
    pub max_hp: i32,
}

impl Entity {
    pub fn new(id: EntityId, position: Vector3, is_player: bool, max_hp: i32) -> Self {
        Self {
            id,
            position,
            velocity: Vector3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            is_player,
            hp: max_hp,
            max_hp,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn apply_damage(&mut self, damage: i32) {
        self.hp = (self.hp - damage).clamp(0, self.max_hp);
    }
}

/// Monotonic player id allocator; never reuses an id within a run.
#[derive(Debug)]
pub struct PlayerIdAllocator {
    next: EntityId,
}

impl PlayerIdAllocator {
    pub fn new(base: EntityId) -> Self {
        Self { next: base }
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}
