/// Closed error taxonomy for world construction and grid queries: a
/// `thiserror` enum at the crate boundary rather than stringly-typed errors.
#[derive(thiserror::Error, Debug)]
pub enum ArenaError {
    #[error("world generator produced an empty obstacle list")]
    EmptyWorld,
    #[error("obstacle out of terrain bounds: {0:?}")]
    ObstacleOutOfBounds(crate::obstacle::Obstacle),
    #[error("unknown entity id: {0}")]
    UnknownEntity(crate::entity::EntityId),
}
