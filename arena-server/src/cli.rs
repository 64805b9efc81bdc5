//! Command-line / environment configuration surface. No other crate reads
//! `std::env` or parses CLI flags directly: `arena-server` is the sole
//! composition root and threads `ArenaConfig` into every other component by
//! value or reference.

use arena_world::ArenaConfig;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "arena-server", about = "Authoritative LOS-filtered arena shooter server")]
pub struct Cli {
    #[arg(long, env = "ARENA_PORT", default_value_t = 3005)]
    pub port: u16,

    #[arg(long, env = "ARENA_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(long, env = "ARENA_WORLD_SEED", default_value_t = 0x5EED_1234)]
    pub world_seed: u64,

    #[arg(long, env = "ARENA_TERRAIN_SIZE", default_value_t = 2000.0)]
    pub terrain_size: f32,

    #[arg(long, env = "ARENA_GRID_SIZE", default_value_t = 400)]
    pub grid_size: i32,

    #[arg(long, env = "ARENA_CELL_SIZE", default_value_t = 5.0)]
    pub cell_size: f32,

    #[arg(long, env = "ARENA_VIEW_DISTANCE", default_value_t = 200.0)]
    pub view_distance: f32,

    #[arg(long, env = "ARENA_BOTS_COUNT", default_value_t = 600)]
    pub bots_count: u32,

    #[arg(long, env = "ARENA_TICK_RATE", default_value_t = 30)]
    pub tick_rate: u32,

    #[arg(long, env = "ARENA_PLAYER_SPEED", default_value_t = 50.0)]
    pub player_speed: f32,

    #[arg(long, env = "ARENA_FIRE_RATE", default_value_t = 5.0)]
    pub fire_rate: f32,

    #[arg(long, env = "ARENA_BULLET_SPEED", default_value_t = 150.0)]
    pub bullet_speed: f32,

    #[arg(long, env = "ARENA_BULLET_DAMAGE", default_value_t = 20)]
    pub bullet_damage: i32,

    #[arg(long, env = "ARENA_BULLET_LIFETIME_MS", default_value_t = 3000)]
    pub bullet_lifetime_ms: u64,

    #[arg(long, env = "ARENA_LOS_GRACE_TICKS", default_value_t = 1)]
    pub los_grace_ticks: u32,
}

impl Cli {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn to_config(&self) -> ArenaConfig {
        ArenaConfig {
            port: self.port,
            terrain_size: self.terrain_size,
            grid_size: self.grid_size,
            cell_size: self.cell_size,
            view_distance: self.view_distance,
            bots_count: self.bots_count,
            tick_rate: self.tick_rate,
            player_speed: self.player_speed,
            fire_rate: self.fire_rate,
            bullet_speed: self.bullet_speed,
            bullet_damage: self.bullet_damage,
            bullet_lifetime_ms: self.bullet_lifetime_ms,
            los_grace_ticks: self.los_grace_ticks,
            ..ArenaConfig::default()
        }
    }
}
