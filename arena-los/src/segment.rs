use std::collections::HashSet;

use arena_math::{ray_vs_aabb, Vector3};
use arena_world::World;

/// Whether the segment `start -> end` is unobstructed by any opaque obstacle.
///
/// Walks the cells the segment's X/Z projection touches (`cellsAlongRay`),
/// testing each obstacle found there against the full 3D segment via the
/// slab method. An obstacle's index is the natural de-duplication key since
/// a single obstacle can be binned into several cells.
pub fn segment_clear(world: &World, start: Vector3, end: Vector3) -> bool {
    let delta = end.sub(start);
    let dist = delta.length();
    if dist < 1e-8 {
        return true;
    }
    let direction = delta.scale(1.0 / dist);

    let mut visited = HashSet::new();
    for cell in world.grid.cells_along_ray(start, end) {
        for &idx in world.grid.obstacles_in_cell(cell) {
            if !visited.insert(idx) {
                continue;
            }
            let obstacle = &world.obstacles[idx];
            if !obstacle.kind.is_opaque_for_los() {
                continue;
            }
            if ray_vs_aabb(start, direction, 0.0, dist, &obstacle.aabb()).is_some() {
                return false;
            }
        }
    }
    true
}
