use arena_math::Vector3;
use arena_world::{ArenaConfig, World};

use crate::segment::segment_clear;

/// Multi-ray silhouette visibility test.
///
/// Casts up to four rays from the viewer's eye to the target's silhouette
/// edges — top-left, top-right, bottom-left, bottom-right, in that order —
/// and returns true on the first one that is unobstructed. This lets a
/// peeker see a hider whose centre line is blocked but whose shoulder or
/// foot is not, without the cost of dense sampling.
pub fn can_see(world: &World, viewer_pos: Vector3, target_pos: Vector3, config: &ArenaConfig) -> bool {
    if viewer_pos.distance_xz(target_pos) < 1e-3 {
        return true;
    }

    let eye = Vector3::new(viewer_pos.x, viewer_pos.y + config.eye_height, viewer_pos.z);
    let direction = target_pos.sub(viewer_pos);
    let perpendicular = direction.perpendicular_xz();
    let offset = perpendicular.scale(config.entity_radius);

    let edges = [
        Vector3::new(target_pos.x + offset.x, target_pos.y + config.entity_height, target_pos.z + offset.z),
        Vector3::new(target_pos.x - offset.x, target_pos.y + config.entity_height, target_pos.z - offset.z),
        Vector3::new(target_pos.x + offset.x, target_pos.y, target_pos.z + offset.z),
        Vector3::new(target_pos.x - offset.x, target_pos.y, target_pos.z - offset.z),
    ];

    edges.into_iter().any(|edge| segment_clear(world, eye, edge))
}
