//! Deterministic procedural heightmap sampled at the same formula the client
//! uses, so feet-height placement agrees metre-for-metre on both sides. The
//! world generator's obstacle placement is treated as an external
//! collaborator; only this sampling function is part of the core.

/// `frac(sin(x*12.9898 + z*78.233) * 43758.5453)`, the canonical cheap
/// pseudo-random hash used by the original shader-derived terrain.
fn seeded_random(x: f32, z: f32) -> f32 {
    let v = (x * 12.9898 + z * 78.233).sin() * 43758.5453;
    v - v.floor()
}

/// Bilinearly-interpolated height at continuous world coordinates `(x, z)`,
/// sampled at `tile_size`-spaced integer tile corners and scaled by
/// `height_scale`.
pub fn ground_height(x: f32, z: f32, tile_size: f32, height_scale: f32) -> f32 {
    let tx = x / tile_size;
    let tz = z / tile_size;
    let x0 = tx.floor();
    let z0 = tz.floor();
    let fx = tx - x0;
    let fz = tz - z0;

    let h00 = seeded_random(x0, z0);
    let h10 = seeded_random(x0 + 1.0, z0);
    let h01 = seeded_random(x0, z0 + 1.0);
    let h11 = seeded_random(x0 + 1.0, z0 + 1.0);

    let h0 = h00 * (1.0 - fx) + h10 * fx;
    let h1 = h01 * (1.0 - fx) + h11 * fx;
    (h0 * (1.0 - fz) + h1 * fz) * height_scale
}

/// Feet-height convention: `position.y = groundHeight(x, z) + 2`.
pub fn feet_height(x: f32, z: f32, tile_size: f32, height_scale: f32) -> f32 {
    ground_height(x, z, tile_size, height_scale) + 2.0
}
