//! Progressive render state.

use glint_scene::{Camera, Color, Scene};
use rand::Rng;
use rand_pcg::Pcg32;

use crate::error::{RenderError, RenderResult};
use crate::params::RenderParams;

/// Initial state shared by every per-pixel generator; pixels differ by stream.
const PIXEL_RNG_STATE: u64 = 961748941;

/// Accumulation buffers and per-pixel generators for a progressive render.
///
/// `image`, `hits` and `rngs` are row-major with `width * height` entries.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub width: u32,
    pub height: u32,
    /// Completed samples per pixel
    pub samples: u32,
    /// Summed radiance per pixel
    pub image: Vec<Color>,
    /// Samples accumulated per pixel
    pub hits: Vec<u32>,
    /// One generator per pixel
    pub rngs: Vec<Pcg32>,
}

impl RenderState {
    /// Allocate zeroed buffers sized from the selected camera.
    ///
    /// The scene is validated first, so dangling indices are reported here
    /// rather than during a sample sweep.
    ///
    /// Each pixel gets its own generator stream, drawn in pixel order from a
    /// master generator seeded with `params.seed`, so the streams depend
    /// only on the seed and the pixel index.
    pub fn new(scene: &Scene, params: &RenderParams) -> RenderResult<Self> {
        if params.resolution == 0 {
            return Err(RenderError::ZeroResolution);
        }
        scene.validate()?;
        let camera = render_camera(scene, params)?;
        let (width, height) = camera.image_size(params.resolution);
        let count = width as usize * height as usize;

        let mut master = Pcg32::new(params.seed, 1);
        let rngs = (0..count)
            .map(|_| {
                let stream = master.gen_range(0..1u64 << 31) / 2 + 1;
                Pcg32::new(PIXEL_RNG_STATE, stream)
            })
            .collect();

        log::debug!("Render state {}x{} (seed {})", width, height, params.seed);
        Ok(Self {
            width,
            height,
            samples: 0,
            image: vec![Color::ZERO; count],
            hits: vec![0; count],
            rngs,
        })
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.image.len()
    }

    /// Whether the sample budget of `params` has been reached.
    pub fn is_done(&self, params: &RenderParams) -> bool {
        self.samples >= params.samples
    }
}

/// Camera selected by the parameters.
pub(crate) fn render_camera<'a>(scene: &'a Scene, params: &RenderParams) -> RenderResult<&'a Camera> {
    scene
        .cameras
        .get(params.camera)
        .ok_or(RenderError::CameraOutOfRange {
            index: params.camera,
            count: scene.cameras.len(),
        })
}
