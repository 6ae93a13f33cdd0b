//! Glint Scene - scene data and evaluation for the Glint path tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene`, `Camera`, `Shape`, `Instance`, `Material`,
//!   `Texture`, `Environment`
//! - **Evaluation**: world-space position, normal, texcoord, resolved
//!   material and environment radiance at a hit
//! - **Loading**: a small JSON scene format
//!
//! # Example
//!
//! ```ignore
//! use glint_scene::Scene;
//!
//! let scene = Scene::load("scene.json")?;
//! println!("Loaded {} instances", scene.instances.len());
//! ```

pub mod camera;
pub mod environment;
pub mod loader;
pub mod material;
pub mod scene;
pub mod shape;
pub mod texture;

// Re-export commonly used types
pub use camera::Camera;
pub use environment::Environment;
pub use loader::{SceneError, SceneResult};
pub use material::{Color, Material, MaterialKind, MaterialPoint};
pub use scene::{Instance, Scene};
pub use shape::{Shape, ShapeKind};
pub use texture::{Texture, TextureError};
