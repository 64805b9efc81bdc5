//! Server-side line-of-sight visibility filtering: the anti-wallhack engine
//! at the centre of this server's design. `segment_clear` is the low-level
//! ray-vs-world-of-obstacles predicate; `can_see` layers the multi-ray
//! silhouette test on top of it so a peeking shoulder or crouched foot can
//! still be spotted around the edge of cover.

mod segment;
mod visibility;

pub use segment::segment_clear;
pub use visibility::can_see;
