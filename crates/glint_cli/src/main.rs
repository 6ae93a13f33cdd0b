//! `glint` command line renderer.

mod demo;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glint_renderer::{
    advance_one_sample, extract_image, Bvh, RenderParams, RenderState, ShaderKind, DEFAULT_SEED,
};
use glint_scene::Scene;
use indicatif::{ProgressBar, ProgressStyle};

/// Progressive multi-shader path tracer
#[derive(Parser, Debug)]
#[command(name = "glint", version, about)]
struct Cli {
    /// JSON scene file
    #[arg(long, conflicts_with = "demo")]
    scene: Option<PathBuf>,

    /// Render the built-in demo scene
    #[arg(long)]
    demo: bool,

    /// Output PNG
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,

    /// Camera index
    #[arg(long, default_value_t = 0)]
    camera: usize,

    /// Size of the larger image side in pixels
    #[arg(short, long, default_value_t = 720)]
    resolution: u32,

    /// Shader: raytrace, matte, eyelight, normal, texcoord, color, matcap, cellshading
    #[arg(long, default_value = "raytrace")]
    shader: ShaderKind,

    /// Samples per pixel
    #[arg(short, long, default_value_t = 512)]
    samples: u32,

    /// Maximum path depth
    #[arg(short, long, default_value_t = 4)]
    bounces: u32,

    /// Render pixels on the calling thread only
    #[arg(long)]
    noparallel: bool,

    /// Seed for the per-pixel generators
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

impl Cli {
    fn params(&self) -> RenderParams {
        RenderParams::default()
            .with_camera(self.camera)
            .with_resolution(self.resolution)
            .with_shader(self.shader)
            .with_quality(self.samples, self.bounces)
            .with_noparallel(self.noparallel)
            .with_seed(self.seed)
    }

    fn load_scene(&self) -> Result<Scene> {
        match (&self.scene, self.demo) {
            (Some(path), _) => {
                Scene::load(path).with_context(|| format!("loading scene {}", path.display()))
            }
            (None, true) => Ok(demo::demo_scene()),
            (None, false) => bail!("either --scene or --demo is required"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let params = cli.params();
    let scene = cli.load_scene()?;
    let bounds = scene.world_bounds();
    log::info!(
        "Scene: {} instances, {} shapes, {} materials, bounds {:?} to {:?}",
        scene.instances.len(),
        scene.shapes.len(),
        scene.materials.len(),
        bounds.min(),
        bounds.max()
    );

    let bvh = Bvh::build(&scene);
    let mut state = RenderState::new(&scene, &params)?;
    log::info!(
        "Rendering {}x{} with {} shader, {} samples, {} bounces",
        state.width,
        state.height,
        params.shader,
        params.samples,
        params.bounces
    );

    let progress = ProgressBar::new(params.samples as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} samples ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    while !state.is_done(&params) {
        advance_one_sample(&mut state, &scene, &bvh, &params)?;
        progress.inc(1);
    }
    progress.finish();

    extract_image(&state)
        .save_png(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    log::info!("Saved {}", cli.output.display());
    Ok(())
}
