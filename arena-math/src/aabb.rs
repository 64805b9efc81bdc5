use crate::Vector3;

/// Axis-aligned bounding box in centre-extent form, matching the wire and
/// world-generator representation (`center`, `size`) rather than min/max.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub center: Vector3,
    pub size: Vector3,
}

impl Aabb {
    pub const fn from_center_size(center: Vector3, size: Vector3) -> Self {
        Self { center, size }
    }

    pub fn min(&self) -> Vector3 {
        Vector3::new(
            self.center.x - self.size.x * 0.5,
            self.center.y - self.size.y * 0.5,
            self.center.z - self.size.z * 0.5,
        )
    }

    pub fn max(&self) -> Vector3 {
        Vector3::new(
            self.center.x + self.size.x * 0.5,
            self.center.y + self.size.y * 0.5,
            self.center.z + self.size.z * 0.5,
        )
    }

    /// This AABB inflated uniformly on the X/Z axes by `radius` (used for
    /// point-vs-obstacle collision against a circular collider).
    pub fn inflated_xz(&self, radius: f32) -> Aabb {
        Aabb::from_center_size(
            self.center,
            Vector3::new(self.size.x + radius * 2.0, self.size.y, self.size.z + radius * 2.0),
        )
    }

    /// Whether the 2D point `(x, z)` lies within this box's X/Z footprint.
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        let min = self.min();
        let max = self.max();
        x >= min.x && x <= max.x && z >= min.z && z <= max.z
    }

    /// Whether this box's X/Z footprint overlaps the square cell
    /// `[cell_min, cell_min + cell_size)` on both axes.
    pub fn overlaps_cell_xz(&self, cell_min_x: f32, cell_min_z: f32, cell_size: f32) -> bool {
        let min = self.min();
        let max = self.max();
        let cell_max_x = cell_min_x + cell_size;
        let cell_max_z = cell_min_z + cell_size;
        min.x < cell_max_x && max.x > cell_min_x && min.z < cell_max_z && max.z > cell_min_z
    }
}
