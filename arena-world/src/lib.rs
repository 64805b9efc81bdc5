//! Static and dynamic world state: obstacles, entities, bullets, the spatial
//! grid that binds them together, and the procedural heightmap. Owned
//! exclusively by the tick orchestrator in `arena-sim`; every other crate
//! borrows from it for the duration of one tick.

pub mod bullet;
pub mod config;
pub mod entity;
pub mod error;
pub mod grid;
pub mod heightmap;
pub mod obstacle;
pub mod world;

pub use bullet::{Bullet, BulletId, HitEvent};
pub use config::ArenaConfig;
pub use entity::{Entity, EntityId, PlayerIdAllocator};
pub use error::ArenaError;
pub use grid::{CellKey, SpatialGrid};
pub use heightmap::{feet_height, ground_height};
pub use obstacle::{Decoration, Obstacle, ObstacleKind};
pub use world::World;
