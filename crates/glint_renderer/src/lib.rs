//! Glint Renderer - progressive multi-shader CPU path tracing.
//!
//! A render is driven in three steps:
//!
//! ```ignore
//! use glint_renderer::{advance_one_sample, extract_image, Bvh, RenderParams, RenderState};
//!
//! let bvh = Bvh::build(&scene);
//! let mut state = RenderState::new(&scene, &params)?;
//! while !state.is_done(&params) {
//!     advance_one_sample(&mut state, &scene, &bvh, &params)?;
//! }
//! extract_image(&state).save_png("out.png")?;
//! ```

mod bvh;
mod camera;
mod error;
mod output;
mod params;
mod primitive;
mod renderer;
mod sampling;
mod shader;
mod state;

pub use bvh::{Bvh, BvhNode, Intersector};
pub use camera::eval_camera;
pub use error::{RenderError, RenderResult};
pub use output::{extract_image, extract_image_into, ColorImage};
pub use params::{RenderParams, DEFAULT_SEED};
pub use primitive::{Geometry, Intersection, Primitive};
pub use renderer::advance_one_sample;
pub use shader::ShaderKind;
pub use state::RenderState;

/// Re-export common math types from glint_math
pub use glint_math::{Ray, Vec2, Vec3, Vec4};
