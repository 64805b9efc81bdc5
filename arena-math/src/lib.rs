//! Vector and axis-aligned bounding box primitives shared by every other
//! `arena-*` crate: the 3D vector type, a centre-extent AABB, and the
//! ray-vs-AABB slab test the LOS engine and the bullet simulator both sweep
//! against.

mod aabb;
mod vector3;

pub use aabb::Aabb;
pub use vector3::Vector3;

/// Result of a ray-vs-AABB slab test, in units of the ray's own parametrization
/// (`t` such that the hit point is `origin + direction * t`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub t_enter: f32,
    pub t_exit: f32,
}

/// Slab-method ray/segment-vs-AABB intersection.
///
/// `origin` + `direction * t` for `t` in `[t_min, t_max]` describes the
/// segment under test; `direction` need not be normalized. Returns `None` if
/// the segment's AABB-clipped parametric range is empty or inverted.
///
/// A ray direction component that is (near) zero is treated as parallel to
/// the corresponding slab: the ray passes the slab test on that axis iff the
/// origin already lies within the slab's bounds on that axis (collinear rays
/// starting outside the slab are correctly rejected).
pub fn ray_vs_aabb(
    origin: Vector3,
    direction: Vector3,
    t_min: f32,
    t_max: f32,
    aabb: &Aabb,
) -> Option<RayHit> {
    const EPSILON: f32 = 1e-8;

    let mut t_enter = t_min;
    let mut t_exit = t_max;

    let (min, max) = (aabb.min(), aabb.max());
    let axes = [
        (origin.x, direction.x, min.x, max.x),
        (origin.y, direction.y, min.y, max.y),
        (origin.z, direction.z, min.z, max.z),
    ];

    for (o, d, lo, hi) in axes {
        if d.abs() < EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv_d = 1.0 / d;
        let mut t0 = (lo - o) * inv_d;
        let mut t1 = (hi - o) * inv_d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(RayHit { t_enter, t_exit })
}
