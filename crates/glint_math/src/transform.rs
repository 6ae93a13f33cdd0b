// Frame utilities for Mat4
//
// Scene frames are affine Mat4s. glam already provides transform_point3()
// and transform_vector3(); this adds the pieces ray tracing needs on top.

use crate::Aabb;
use glam::{Mat4, Vec3, Vec4};

/// Extension trait for Mat4 frames.
pub trait Mat4Ext {
    /// Transform a surface normal (inverse transpose), renormalized.
    fn transform_normal(&self, normal: Vec3) -> Vec3;

    /// Transform a direction and renormalize it.
    fn transform_direction(&self, direction: Vec3) -> Vec3;

    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        let n = self.inverse().transpose() * Vec4::new(normal.x, normal.y, normal.z, 0.0);
        n.truncate().normalize_or_zero()
    }

    fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.transform_vector3(direction).normalize_or_zero()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let (lo, hi) = (aabb.min(), aabb.max());
        let corners: Vec<Vec3> = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { lo.x } else { hi.x },
                    if i & 2 == 0 { lo.y } else { hi.y },
                    if i & 4 == 0 { lo.z } else { hi.z },
                )
            })
            .map(|corner| self.transform_point3(corner))
            .collect();
        Aabb::from_slice(&corners)
    }
}

/// Frame located at `eye` whose -z axis looks toward `center`.
///
/// Columns are the orthonormal x, y, z axes followed by the origin.
pub fn lookat_frame(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
    let w = (eye - center).normalize();
    let u = up.cross(w).normalize();
    let v = w.cross(u);
    Mat4::from_cols(u.extend(0.0), v.extend(0.0), w.extend(0.0), eye.extend(1.0))
}
