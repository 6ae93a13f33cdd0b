//! Infinite environment lights.

use std::f32::consts::PI;

use glint_math::{Mat3, Mat4, Vec2, Vec3};
use serde::Deserialize;

use crate::material::Color;

/// An environment surrounding the scene.
///
/// Radiance is `emission`, optionally modulated by a lat-long texture
/// looked up in the environment's local frame. `frame` is a rigid
/// transform; only its rotation affects lookups.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub frame: Mat4,
    pub emission: Color,
    /// Index into `Scene::textures`
    pub emission_tex: Option<usize>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            frame: Mat4::IDENTITY,
            emission: Color::ZERO,
            emission_tex: None,
        }
    }
}

impl Environment {
    /// Constant environment.
    pub fn constant(emission: Color) -> Self {
        Self {
            emission,
            ..Default::default()
        }
    }

    /// Lat-long texture coordinates for a world-space direction.
    ///
    /// u wraps around the local y axis, v runs from +y (0) to -y (1).
    pub fn texcoord(&self, direction: Vec3) -> Vec2 {
        // Inverse of a rotation is its transpose
        let local = (Mat3::from_mat4(self.frame).transpose() * direction).normalize_or_zero();
        let mut u = local.z.atan2(local.x) / (2.0 * PI);
        if u < 0.0 {
            u += 1.0;
        }
        let v = local.y.clamp(-1.0, 1.0).acos() / PI;
        Vec2::new(u, v)
    }
}
