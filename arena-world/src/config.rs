/// All tunables named in the wire/gameplay contract, collected into one
/// struct rather than scattered `const`s so `arena-server` can override them
/// from the environment without any other crate touching `std::env` itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaConfig {
    pub port: u16,
    pub terrain_size: f32,
    pub grid_size: i32,
    pub cell_size: f32,
    pub view_distance: f32,
    pub bots_count: u32,
    pub tick_rate: u32,
    pub player_speed: f32,
    pub player_radius: f32,
    pub bot_speed: f32,
    pub bot_turn_speed: f32,
    pub bot_radius: f32,
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_damage: i32,
    pub bullet_lifetime_ms: u64,
    pub bullet_radius: f32,
    pub entity_radius: f32,
    pub entity_height: f32,
    pub eye_height: f32,
    pub los_grace_ticks: u32,
    pub tile_size: f32,
    pub height_scale: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            port: 3005,
            terrain_size: 2000.0,
            grid_size: 400,
            cell_size: 5.0,
            view_distance: 200.0,
            bots_count: 600,
            tick_rate: 30,
            player_speed: 50.0,
            player_radius: 1.5,
            bot_speed: 5.0,
            bot_turn_speed: 1.0,
            bot_radius: 1.5,
            fire_rate: 5.0,
            bullet_speed: 150.0,
            bullet_damage: 20,
            bullet_lifetime_ms: 3000,
            bullet_radius: 0.3,
            entity_radius: 1.0,
            entity_height: 3.6,
            eye_height: 3.0,
            los_grace_ticks: 1,
            tile_size: 10.0,
            height_scale: 2.5,
        }
    }
}

impl ArenaConfig {
    /// `[-bound, +bound]` soft boundary bots turn away from before the hard
    /// boundary applies (§4.4: `worldSize/2 - 50`).
    pub fn bot_soft_boundary(&self) -> f32 {
        self.terrain_size / 2.0 - 50.0
    }

    /// Hard boundary players/bullets are stopped at (§4.5: `worldSize/2 - 10`).
    pub fn hard_boundary(&self) -> f32 {
        self.terrain_size / 2.0 - 10.0
    }

    pub fn tick_interval_ms(&self) -> u64 {
        1000 / self.tick_rate as u64
    }

    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Half-span of the uniform, centered respawn box (`worldSize - 200`).
    pub fn respawn_half_extent(&self) -> f32 {
        (self.terrain_size - 200.0) / 2.0
    }

    /// First id assigned to a connecting player; ids below this are reserved
    /// for bots `[0, bots_count)`.
    pub const PLAYER_ID_BASE: u32 = 1000;
}
