//! Deterministic obstacle placement. The world generator is treated as an
//! external collaborator accessed only through its output contract — an
//! obstacle list (the heightmap sampler itself already lives in
//! `arena_world::heightmap`, shared by client and server alike) — so this
//! module is intentionally the thinnest part of the workspace: a seeded
//! scatter of obstacle kinds, with no gameplay logic of its own.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use arena_math::Vector3;
use arena_world::{ArenaConfig, ArenaError, Decoration, Obstacle, ObstacleKind};

const BOUNDARY_THICKNESS: f32 = 10.0;
const BOUNDARY_HEIGHT: f32 = 40.0;

/// Produces a deterministic obstacle list for `config`, seeded by `seed` so
/// the same seed always yields the same world (useful for reproducing a
/// reported wallhack or collision bug).
///
/// Fails with [`ArenaError::EmptyWorld`] if the generator produced no
/// obstacles at all — it always emits the boundary wall ring, so an empty
/// result means generation itself is broken, not that zero obstacles is a
/// legitimate world (this is a fatal world-initialisation error, not a
/// per-tick one).
pub fn generate_obstacles(config: &ArenaConfig, seed: u64) -> Result<Vec<Obstacle>, ArenaError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut obstacles = Vec::new();
    let half = config.terrain_size / 2.0;

    push_boundary_walls(&mut obstacles, half);
    push_houses(&mut obstacles, &mut rng, half, 24);
    push_scatter(&mut obstacles, &mut rng, half, ObstacleKind::Ruins, 10, (4.0, 10.0), (3.0, 8.0));
    push_scatter(&mut obstacles, &mut rng, half, ObstacleKind::Tower, 8, (4.0, 6.0), (16.0, 24.0));
    push_scatter(&mut obstacles, &mut rng, half, ObstacleKind::Shed, 16, (5.0, 8.0), (4.0, 6.0));
    push_scatter(&mut obstacles, &mut rng, half, ObstacleKind::Crate, 60, (1.0, 2.0), (1.0, 2.0));
    push_scatter(&mut obstacles, &mut rng, half, ObstacleKind::Barricade, 40, (2.0, 4.0), (1.0, 1.5));
    push_scatter(&mut obstacles, &mut rng, half, ObstacleKind::Rock, 50, (2.0, 5.0), (1.5, 3.0));
    push_fences(&mut obstacles, &mut rng, half, 30);
    push_trees(&mut obstacles, &mut rng, half, 120);
    push_hills(&mut obstacles, &mut rng, half, 12);

    if obstacles.is_empty() {
        return Err(ArenaError::EmptyWorld);
    }

    Ok(obstacles)
}

fn push_boundary_walls(obstacles: &mut Vec<Obstacle>, half: f32) {
    let span = half * 2.0 + BOUNDARY_THICKNESS * 2.0;
    let edges = [
        Vector3::new(0.0, BOUNDARY_HEIGHT / 2.0, half + BOUNDARY_THICKNESS / 2.0),
        Vector3::new(0.0, BOUNDARY_HEIGHT / 2.0, -(half + BOUNDARY_THICKNESS / 2.0)),
        Vector3::new(half + BOUNDARY_THICKNESS / 2.0, BOUNDARY_HEIGHT / 2.0, 0.0),
        Vector3::new(-(half + BOUNDARY_THICKNESS / 2.0), BOUNDARY_HEIGHT / 2.0, 0.0),
    ];
    for (i, center) in edges.into_iter().enumerate() {
        let size = if i < 2 { Vector3::new(span, BOUNDARY_HEIGHT, BOUNDARY_THICKNESS) } else { Vector3::new(BOUNDARY_THICKNESS, BOUNDARY_HEIGHT, span) };
        obstacles.push(Obstacle::new(center, size, ObstacleKind::Boundary));
    }
}

fn random_xz(rng: &mut impl Rng, half: f32, margin: f32) -> (f32, f32) {
    let bound = half - margin;
    (rng.random_range(-bound..=bound), rng.random_range(-bound..=bound))
}

/// A "house" is four `HouseWall` segments forming an open-fronted rectangle,
/// matching the source's coarse building silhouettes closely enough for the
/// LOS engine to treat each wall as an independent occluder.
fn push_houses(obstacles: &mut Vec<Obstacle>, rng: &mut impl Rng, half: f32, count: usize) {
    for _ in 0..count {
        let (cx, cz) = random_xz(rng, half, 60.0);
        let w = rng.random_range(10.0..20.0);
        let d = rng.random_range(10.0..20.0);
        let h = rng.random_range(8.0..14.0);
        let thickness = 1.0;
        let walls = [
            (Vector3::new(cx, h / 2.0, cz - d / 2.0), Vector3::new(w, h, thickness)),
            (Vector3::new(cx, h / 2.0, cz + d / 2.0), Vector3::new(w, h, thickness)),
            (Vector3::new(cx - w / 2.0, h / 2.0, cz), Vector3::new(thickness, h, d)),
            // Front wall left open by a gap: two half-segments instead of one.
            (Vector3::new(cx + w / 2.0, h / 2.0, cz - d / 4.0), Vector3::new(thickness, h, d / 2.0)),
        ];
        for (center, size) in walls {
            obstacles.push(Obstacle::new(center, size, ObstacleKind::HouseWall));
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn push_scatter(
    obstacles: &mut Vec<Obstacle>,
    rng: &mut impl Rng,
    half: f32,
    kind: ObstacleKind,
    count: usize,
    xz_range: (f32, f32),
    height_range: (f32, f32),
) {
    for _ in 0..count {
        let (cx, cz) = random_xz(rng, half, 30.0);
        let sx = rng.random_range(xz_range.0..xz_range.1);
        let sz = rng.random_range(xz_range.0..xz_range.1);
        let h = rng.random_range(height_range.0..height_range.1);
        obstacles.push(Obstacle::new(Vector3::new(cx, h / 2.0, cz), Vector3::new(sx, h, sz), kind));
    }
}

fn push_fences(obstacles: &mut Vec<Obstacle>, rng: &mut impl Rng, half: f32, count: usize) {
    for _ in 0..count {
        let (cx, cz) = random_xz(rng, half, 30.0);
        let horizontal = rng.random_bool(0.5);
        let length = rng.random_range(6.0..14.0);
        let size = if horizontal { Vector3::new(length, 1.5, 0.3) } else { Vector3::new(0.3, 1.5, length) };
        obstacles.push(Obstacle::new(Vector3::new(cx, 0.75, cz), size, ObstacleKind::Fence));
    }
}

fn push_trees(obstacles: &mut Vec<Obstacle>, rng: &mut impl Rng, half: f32, count: usize) {
    for _ in 0..count {
        let (cx, cz) = random_xz(rng, half, 20.0);
        let trunk_height = rng.random_range(6.0..10.0);
        let trunk_radius = rng.random_range(0.3..0.6);
        let foliage_radius = rng.random_range(2.5..4.5);
        let mut trunk = Obstacle::new(Vector3::new(cx, trunk_height / 2.0, cz), Vector3::new(trunk_radius * 2.0, trunk_height, trunk_radius * 2.0), ObstacleKind::Tree);
        trunk.decoration = Decoration { trunk_radius: Some(trunk_radius), foliage_radius: None, foliage_color: None };
        obstacles.push(trunk);

        let mut foliage = Obstacle::new(
            Vector3::new(cx, trunk_height + foliage_radius * 0.6, cz),
            Vector3::new(foliage_radius * 2.0, foliage_radius * 1.6, foliage_radius * 2.0),
            ObstacleKind::TreeFoliage,
        );
        foliage.decoration = Decoration { trunk_radius: None, foliage_radius: Some(foliage_radius), foliage_color: Some(0x2E8B3D) };
        obstacles.push(foliage);
    }
}

/// Hills are opaque-for-LOS decoration only (`Hill` is not solid-for-movement),
/// standing in for the broader terrain swell a full heightmap mesh would
/// otherwise provide.
fn push_hills(obstacles: &mut Vec<Obstacle>, rng: &mut impl Rng, half: f32, count: usize) {
    for _ in 0..count {
        let (cx, cz) = random_xz(rng, half, 80.0);
        let radius = rng.random_range(15.0..35.0);
        let height = rng.random_range(4.0..10.0);
        obstacles.push(Obstacle::new(Vector3::new(cx, height / 2.0, cz), Vector3::new(radius, height, radius), ObstacleKind::Hill));
    }
}
