//! Pinhole camera description.

use glint_math::{lookat_frame, Mat4, Vec3};
use serde::Deserialize;

/// A pinhole camera.
///
/// The camera looks down the -z axis of `frame`. `film` is the size of the
/// larger film side and `lens` the distance from the center of projection
/// to the film, both in meters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Camera-to-world frame
    pub frame: Mat4,
    /// Focal length
    pub lens: f32,
    /// Larger film dimension
    pub film: f32,
    /// Width over height
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            frame: Mat4::IDENTITY,
            lens: 0.050,
            film: 0.036,
            aspect: 1.5,
        }
    }
}

impl Camera {
    /// Camera at `from` looking toward `to`.
    pub fn look_at(from: Vec3, to: Vec3, up: Vec3) -> Self {
        Self {
            frame: lookat_frame(from, to, up),
            ..Default::default()
        }
    }

    /// Set the aspect ratio.
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Set focal length and film size.
    pub fn with_lens(mut self, lens: f32, film: f32) -> Self {
        self.lens = lens;
        self.film = film;
        self
    }

    /// Film rectangle size, with `film` on the larger side.
    pub fn film_size(&self) -> (f32, f32) {
        if self.aspect >= 1.0 {
            (self.film, self.film / self.aspect)
        } else {
            (self.film * self.aspect, self.film)
        }
    }

    /// Image size in pixels for a target resolution along the larger side.
    ///
    /// The smaller side is rounded and never drops below one pixel.
    pub fn image_size(&self, resolution: u32) -> (u32, u32) {
        if self.aspect >= 1.0 {
            let height = (resolution as f32 / self.aspect).round() as u32;
            (resolution, height.max(1))
        } else {
            let width = (resolution as f32 * self.aspect).round() as u32;
            (width.max(1), resolution)
        }
    }
}
