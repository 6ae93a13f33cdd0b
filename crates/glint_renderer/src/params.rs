//! Render parameters.

use crate::shader::ShaderKind;

/// Default seed basis for the per-pixel generators.
pub const DEFAULT_SEED: u64 = 1301081;

/// Render configuration, immutable for the duration of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    /// Index into `Scene::cameras`
    pub camera: usize,
    /// Pixel count along the larger image side
    pub resolution: u32,
    /// Surface shader
    pub shader: ShaderKind,
    /// Maximum samples per pixel
    pub samples: u32,
    /// Maximum path depth
    pub bounces: u32,
    /// Trace pixels sequentially instead of with rayon
    pub noparallel: bool,
    /// Seed basis for the per-pixel generators
    pub seed: u64,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            camera: 0,
            resolution: 720,
            shader: ShaderKind::Raytrace,
            samples: 512,
            bounces: 4,
            noparallel: false,
            seed: DEFAULT_SEED,
        }
    }
}

impl RenderParams {
    pub fn with_camera(mut self, camera: usize) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_shader(mut self, shader: ShaderKind) -> Self {
        self.shader = shader;
        self
    }

    /// Set sample and bounce budgets.
    pub fn with_quality(mut self, samples: u32, bounces: u32) -> Self {
        self.samples = samples;
        self.bounces = bounces;
        self
    }

    pub fn with_noparallel(mut self, noparallel: bool) -> Self {
        self.noparallel = noparallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
