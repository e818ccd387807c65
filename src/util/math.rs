//! Math type re-exports and codec-specific math utilities.
//!
//! Re-exports the glam types used throughout the crate and provides the
//! small fixed-order conversions the wire format depends on.

// Re-export glam types
pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

use bytemuck::{Pod, Zeroable};

/// 3D axis-aligned bounding box, single precision.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Empty bounding box (inverted, expands on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Bounding box of a point set. Empty input yields [`Aabb::EMPTY`].
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::EMPTY;
        for &p in points {
            aabb.expand(p);
        }
        aabb
    }
}

/// Flatten a 4x4 matrix into 16 floats, row-major.
///
/// glam stores matrices column-major; the wire format stores them row by
/// row, consistent across model/skeleton/prefab payloads.
#[inline]
pub fn mat4_rows(m: &Mat4) -> [f32; 16] {
    m.transpose().to_cols_array()
}

/// Quaternion in wire order (w, x, y, z).
#[inline]
pub fn quat_wxyz(q: Quat) -> [f32; 4] {
    [q.w, q.x, q.y, q.z]
}

/// Un-normalized face normal of a triangle.
///
/// The magnitude is twice the face area, so summing these per vertex gives
/// the area-weighted accumulation the normal derivation relies on.
#[inline]
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}
