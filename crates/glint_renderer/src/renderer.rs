//! Progressive sample scheduler.
//!
//! Each call to [`advance_one_sample`] adds one sample to every pixel:
//! - Single-sample renders trace through pixel centers, sequentially
//! - Otherwise each pixel jitters with its own generator
//! - Pixels run in parallel with rayon unless `noparallel` is set
//!
//! Pixels never share state, so sequential and parallel sweeps produce the
//! same image.

use glint_math::Vec2;
use glint_scene::{Camera, Color, Scene};
use rand_pcg::Pcg32;
use rayon::prelude::*;

use crate::bvh::Intersector;
use crate::camera::eval_camera;
use crate::error::RenderResult;
use crate::params::RenderParams;
use crate::sampling::rand1f;
use crate::state::{render_camera, RenderState};

/// Add one sample per pixel to `state`. Does nothing once the sample budget
/// in `params` is reached.
pub fn advance_one_sample(
    state: &mut RenderState,
    scene: &Scene,
    bvh: &dyn Intersector,
    params: &RenderParams,
) -> RenderResult<()> {
    if state.is_done(params) {
        return Ok(());
    }
    let camera = render_camera(scene, params)?;
    state.samples += 1;

    let sweep = Sweep {
        scene,
        bvh,
        camera,
        params,
        width: state.width,
        height: state.height,
        pixel_centers: params.samples == 1,
    };

    if sweep.pixel_centers || params.noparallel {
        let pixels = state
            .image
            .iter_mut()
            .zip(state.hits.iter_mut())
            .zip(state.rngs.iter_mut());
        for (idx, ((radiance, hits), rng)) in pixels.enumerate() {
            sweep.sample_pixel(idx, radiance, hits, rng);
        }
    } else {
        state
            .image
            .par_iter_mut()
            .zip(state.hits.par_iter_mut())
            .zip(state.rngs.par_iter_mut())
            .enumerate()
            .for_each(|(idx, ((radiance, hits), rng))| {
                sweep.sample_pixel(idx, radiance, hits, rng);
            });
    }

    log::debug!("Sample {}/{} done", state.samples, params.samples);
    Ok(())
}

/// Read-only context shared by all pixels of one sweep.
struct Sweep<'a> {
    scene: &'a Scene,
    bvh: &'a dyn Intersector,
    camera: &'a Camera,
    params: &'a RenderParams,
    width: u32,
    height: u32,
    pixel_centers: bool,
}

impl Sweep<'_> {
    fn sample_pixel(&self, idx: usize, radiance: &mut Color, hits: &mut u32, rng: &mut Pcg32) {
        let i = (idx % self.width as usize) as f32;
        let j = (idx / self.width as usize) as f32;

        let (du, dv) = if self.pixel_centers {
            (0.5, 0.5)
        } else {
            let du = rand1f(rng);
            let dv = rand1f(rng);
            (du, dv)
        };
        let uv = Vec2::new((i + du) / self.width as f32, (j + dv) / self.height as f32);

        let ray = eval_camera(self.camera, uv);
        let sample = self
            .params
            .shader
            .shade(self.scene, self.bvh, &ray, 0, rng, self.params);

        *radiance += if sample.is_finite() { sample } else { Color::ZERO };
        *hits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::Bvh;
    use crate::output::extract_image;
    use crate::shader::ShaderKind;
    use glint_math::{Mat4, Vec3};
    use glint_scene::{Environment, Material, Shape};

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.add_camera(Camera::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y));
        let shape = scene.add_shape(Shape::uv_sphere(12, 1.0));
        let material = scene.add_material(Material::matte(Color::new(0.7, 0.5, 0.3)));
        scene.add_instance(Mat4::IDENTITY, shape, material);
        scene.add_environment(Environment::constant(Color::splat(0.5)));
        scene
    }

    #[test]
    fn test_sample_counter_and_budget() {
        let scene = scene();
        let bvh = Bvh::build(&scene);
        let params = RenderParams::default().with_resolution(12).with_quality(2, 2);
        let mut state = RenderState::new(&scene, &params).unwrap();

        advance_one_sample(&mut state, &scene, &bvh, &params).unwrap();
        assert_eq!(state.samples, 1);
        assert!(state.hits.iter().all(|&h| h == 1));

        advance_one_sample(&mut state, &scene, &bvh, &params).unwrap();
        assert!(state.is_done(&params));

        // Exhausted: no-op
        let before = state.image.clone();
        advance_one_sample(&mut state, &scene, &bvh, &params).unwrap();
        assert_eq!(state.samples, 2);
        assert!(state.hits.iter().all(|&h| h == 2));
        assert_eq!(state.image, before);
    }

    #[test]
    fn test_single_sample_uses_pixel_centers() {
        let scene = scene();
        let bvh = Bvh::build(&scene);
        let params = RenderParams::default()
            .with_resolution(9)
            .with_quality(1, 0)
            .with_shader(ShaderKind::Color);
        let mut state = RenderState::new(&scene, &params).unwrap();
        let rngs_before: Vec<Pcg32> = state.rngs.clone();

        advance_one_sample(&mut state, &scene, &bvh, &params).unwrap();

        // Center pixel of a centered sphere shows its color; generators untouched
        let center = (state.height / 2 * state.width + state.width / 2) as usize;
        assert_eq!(state.image[center], Color::new(0.7, 0.5, 0.3));
        assert_eq!(state.rngs, rngs_before);
    }

    #[test]
    fn test_non_finite_radiance_is_dropped() {
        let mut scene = scene();
        scene.environments[0] = Environment::constant(Color::new(f32::INFINITY, 0.0, 0.0));
        let bvh = Bvh::build(&scene);
        let params = RenderParams::default().with_resolution(8).with_quality(4, 1);
        let mut state = RenderState::new(&scene, &params).unwrap();

        advance_one_sample(&mut state, &scene, &bvh, &params).unwrap();
        assert!(state.image.iter().all(|c| c.is_finite()));
        // Corner pixels miss the sphere
        assert_eq!(state.image[0], Color::ZERO);
    }

    #[test]
    fn test_extract_matches_accumulator() {
        let scene = scene();
        let bvh = Bvh::build(&scene);
        let params = RenderParams::default().with_resolution(10).with_quality(8, 2);
        let mut state = RenderState::new(&scene, &params).unwrap();

        for k in 1..=3u32 {
            advance_one_sample(&mut state, &scene, &bvh, &params).unwrap();
            let image = extract_image(&state);
            for (pixel, sum) in image.pixels.iter().zip(&state.image) {
                assert_eq!(pixel.truncate(), *sum * (1.0 / k as f32));
                assert_eq!(pixel.w, 1.0);
            }
        }
    }
}
