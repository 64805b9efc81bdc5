//! Per-tick simulation: bot AI, player movement, bullet CCD, the client
//! session table, rolling stats, and the tick orchestrator that sequences
//! all of it.

pub mod bot;
pub mod bullet_sim;
pub mod orchestrator;
pub mod player;
pub mod session;
pub mod stats;

pub use bot::step_bot;
pub use bullet_sim::{direction_from_yaw_pitch, step_bullets, try_fire};
pub use orchestrator::{LoopState, Orchestrator};
pub use player::step_player;
pub use session::ClientSession;
pub use stats::{RollingStats, StatsSnapshot};
