//! Camera ray generation.

use glint_math::{Mat4Ext, Ray, Vec2, Vec3};
use glint_scene::Camera;

/// Generate the primary ray through normalized image coordinates `uv`.
///
/// `uv` = (0, 0) is the top-left corner of the image and (1, 1) the
/// bottom-right. The film sits `lens` behind the center of projection, so
/// rays leave through the frame's -z axis.
pub fn eval_camera(camera: &Camera, uv: Vec2) -> Ray {
    let (film_x, film_y) = camera.film_size();
    let q = Vec3::new(film_x * (0.5 - uv.x), film_y * (uv.y - 0.5), camera.lens);
    let e = Vec3::ZERO;
    let d = (e - q).normalize();

    Ray::new(
        camera.frame.transform_point3(e),
        camera.frame.transform_direction(d),
    )
}
