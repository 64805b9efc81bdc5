use std::collections::{HashMap, HashSet};

use arena_math::{Aabb, Vector3};

use crate::entity::EntityId;

/// Packed integer cell key (`cellX * 10_000 + cellZ`): avoids allocating a
/// textual key when an entity stays in the same cell from tick to tick.
pub type CellKey = i64;

fn pack(cell_x: i32, cell_z: i32) -> CellKey {
    cell_x as i64 * 10_000 + cell_z as i64
}

/// Uniform 2D grid over the X/Z plane. Obstacles are identified by their
/// stable index into the world's obstacle array — the natural key for
/// deduplication. Entity cell membership is updated only on cell crossing.
pub struct SpatialGrid {
    cell_size: f32,
    terrain_size: f32,
    obstacle_cells: HashMap<CellKey, Vec<usize>>,
    nearby_obstacle_cache: HashMap<CellKey, Vec<usize>>,
    entity_cells: HashMap<CellKey, HashSet<EntityId>>,
    entity_cell_of: HashMap<EntityId, CellKey>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32, terrain_size: f32) -> Self {
        Self {
            cell_size,
            terrain_size,
            obstacle_cells: HashMap::new(),
            nearby_obstacle_cache: HashMap::new(),
            entity_cells: HashMap::new(),
            entity_cell_of: HashMap::new(),
        }
    }

    /// `floor((coord + terrainSize/2) / cellSize)` on each axis.
    pub fn locate(&self, x: f32, z: f32) -> (i32, i32) {
        let half = self.terrain_size / 2.0;
        let cx = ((x + half) / self.cell_size).floor() as i32;
        let cz = ((z + half) / self.cell_size).floor() as i32;
        (cx, cz)
    }

    fn cell_min(&self, cell_x: i32, cell_z: i32) -> (f32, f32) {
        let half = self.terrain_size / 2.0;
        (cell_x as f32 * self.cell_size - half, cell_z as f32 * self.cell_size - half)
    }

    /// Bin `obstacle_index` into every cell its AABB footprint overlaps.
    /// Call once per obstacle at world-load time, then [`Self::build_nearby_cache`].
    pub fn insert_obstacle(&mut self, obstacle_index: usize, aabb: &Aabb) {
        let min = aabb.min();
        let max = aabb.max();
        let (cx0, cz0) = self.locate(min.x, min.z);
        let (cx1, cz1) = self.locate(max.x, max.z);
        for cx in cx0..=cx1 {
            for cz in cz0..=cz1 {
                let (cell_min_x, cell_min_z) = self.cell_min(cx, cz);
                if aabb.overlaps_cell_xz(cell_min_x, cell_min_z, self.cell_size) {
                    self.obstacle_cells.entry(pack(cx, cz)).or_default().push(obstacle_index);
                }
            }
        }
    }

    /// Precompute, for every cell that exists or borders an existing cell,
    /// the deduplicated union of obstacles in that cell and its 8 neighbours.
    pub fn build_nearby_cache(&mut self) {
        self.nearby_obstacle_cache.clear();
        let mut candidate_cells: HashSet<(i32, i32)> = HashSet::new();
        for key in self.obstacle_cells.keys() {
            let cx = (*key).div_euclid(10_000) as i32;
            let cz = (*key).rem_euclid(10_000) as i32;
            for dx in -1..=1 {
                for dz in -1..=1 {
                    candidate_cells.insert((cx + dx, cz + dz));
                }
            }
        }
        for (cx, cz) in candidate_cells {
            let mut seen = HashSet::new();
            let mut union = Vec::new();
            for dx in -1..=1 {
                for dz in -1..=1 {
                    if let Some(list) = self.obstacle_cells.get(&pack(cx + dx, cz + dz)) {
                        for &idx in list {
                            if seen.insert(idx) {
                                union.push(idx);
                            }
                        }
                    }
                }
            }
            self.nearby_obstacle_cache.insert(pack(cx, cz), union);
        }
    }

    /// Precomputed 3x3 union of obstacles for the cell containing `(x, z)`;
    /// empty if no neighbouring cell exists.
    pub fn nearby_obstacles(&self, x: f32, z: f32) -> &[usize] {
        let (cx, cz) = self.locate(x, z);
        self.nearby_obstacle_cache.get(&pack(cx, cz)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Obstacles whose footprint was binned directly into this cell (not its
    /// neighbours) — used by the LOS engine, which already walks every cell
    /// the segment touches.
    pub fn obstacles_in_cell(&self, cell_key: CellKey) -> &[usize] {
        self.obstacle_cells.get(&cell_key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Insert or relocate an entity's cell membership to the cell containing
    /// `new_pos`. No-op if the packed cell key is unchanged.
    pub fn move_entity(&mut self, id: EntityId, new_pos: Vector3) {
        let (cx, cz) = self.locate(new_pos.x, new_pos.z);
        let new_key = pack(cx, cz);
        if let Some(&old_key) = self.entity_cell_of.get(&id) {
            if old_key == new_key {
                return;
            }
            if let Some(set) = self.entity_cells.get_mut(&old_key) {
                set.remove(&id);
            }
        }
        self.entity_cells.entry(new_key).or_default().insert(id);
        self.entity_cell_of.insert(id, new_key);
    }

    /// Evict `id` from its recorded cell entirely.
    pub fn remove_entity(&mut self, id: EntityId) {
        if let Some(old_key) = self.entity_cell_of.remove(&id) {
            if let Some(set) = self.entity_cells.get_mut(&old_key) {
                set.remove(&id);
            }
        }
    }

    /// The cell key `id` is currently recorded under, if any.
    pub fn entity_cell(&self, id: EntityId) -> Option<CellKey> {
        self.entity_cell_of.get(&id).copied()
    }

    pub fn entities_in_cell(&self, cell_key: CellKey) -> impl Iterator<Item = EntityId> + '_ {
        self.entity_cells.get(&cell_key).into_iter().flatten().copied()
    }

    /// Every cell the 2D segment `start -> end` (projected onto X/Z) touches,
    /// in traversal order, via Amanatides-Woo DDA. Guarantees no pierced cell
    /// is omitted, including for rays nearly parallel to a cell diagonal.
    pub fn cells_along_ray(&self, start: Vector3, end: Vector3) -> Vec<CellKey> {
        let dx = end.x - start.x;
        let dz = end.z - start.z;
        let dist = (dx * dx + dz * dz).sqrt();
        if dist < 1e-6 {
            let (cx, cz) = self.locate(start.x, start.z);
            return vec![pack(cx, cz)];
        }

        let (mut cx, mut cz) = self.locate(start.x, start.z);
        let (end_cx, end_cz) = self.locate(end.x, end.z);

        let step_x: i32 = if dx > 0.0 { 1 } else if dx < 0.0 { -1 } else { 0 };
        let step_z: i32 = if dz > 0.0 { 1 } else if dz < 0.0 { -1 } else { 0 };

        let (next_boundary_x, next_boundary_z) = self.cell_min(cx, cz);
        let next_boundary_x = if step_x > 0 { next_boundary_x + self.cell_size } else { next_boundary_x };
        let next_boundary_z = if step_z > 0 { next_boundary_z + self.cell_size } else { next_boundary_z };

        let mut t_max_x = if step_x != 0 {
            (next_boundary_x - start.x) / dx
        } else {
            f32::INFINITY
        };
        let mut t_max_z = if step_z != 0 {
            (next_boundary_z - start.z) / dz
        } else {
            f32::INFINITY
        };
        let t_delta_x = if step_x != 0 { self.cell_size / dx.abs() } else { f32::INFINITY };
        let t_delta_z = if step_z != 0 { self.cell_size / dz.abs() } else { f32::INFINITY };

        let mut out = vec![pack(cx, cz)];
        // Generous bound: grid_size^2 covers any reachable path within the
        // world; this prevents an unbounded loop if float drift ever keeps
        // t_max from overtaking the segment length.
        let max_steps = 4 * (((dist / self.cell_size).ceil() as usize) + 4);
        for _ in 0..max_steps {
            if cx == end_cx && cz == end_cz {
                break;
            }
            if t_max_x < t_max_z {
                t_max_x += t_delta_x;
                cx += step_x;
            } else {
                t_max_z += t_delta_z;
                cz += step_z;
            }
            out.push(pack(cx, cz));
        }
        out
    }
}
