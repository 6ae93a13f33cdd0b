//! JSON scene loading.
//!
//! A scene file is a JSON object with optional arrays `cameras`, `textures`,
//! `materials`, `shapes`, `instances` and `environments`. References between
//! them are plain array indices, checked by [`Scene::validate`] after parsing.
//!
//! ```json
//! {
//!   "cameras": [{ "lookat": { "from": [0, 1, 5], "to": [0, 0, 0] }, "aspect": 1.5 }],
//!   "textures": [{ "path": "grid.png" }],
//!   "materials": [{ "kind": "matte", "color": [0.7, 0.7, 0.7], "color_tex": 0 }],
//!   "shapes": [{ "generator": { "type": "sphere", "steps": 32, "radius": 1.0 } }],
//!   "instances": [{ "shape": 0, "material": 0, "translation": [0, 1, 0] }],
//!   "environments": [{ "emission": [0.5, 0.5, 0.5] }]
//! }
//! ```

use std::path::{Path, PathBuf};

use glint_math::{Mat4, Vec3};
use serde::Deserialize;
use thiserror::Error;

use crate::camera::Camera;
use crate::environment::Environment;
use crate::material::Material;
use crate::scene::{Instance, Scene};
use crate::shape::Shape;
use crate::texture::{Texture, TextureError};

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

/// Result type for loading operations.
pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SceneFile {
    cameras: Vec<CameraEntry>,
    textures: Vec<TextureEntry>,
    materials: Vec<Material>,
    shapes: Vec<ShapeEntry>,
    instances: Vec<InstanceEntry>,
    environments: Vec<Environment>,
}

#[derive(Debug, Deserialize)]
struct CameraEntry {
    #[serde(flatten)]
    camera: Camera,
    lookat: Option<LookAt>,
}

#[derive(Debug, Deserialize)]
struct LookAt {
    from: Vec3,
    to: Vec3,
    #[serde(default = "default_up")]
    up: Vec3,
}

fn default_up() -> Vec3 {
    Vec3::Y
}

#[derive(Debug, Deserialize)]
struct TextureEntry {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ShapeEntry {
    Generated { generator: Generator },
    Inline(Shape),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Generator {
    Sphere {
        #[serde(default = "default_steps")]
        steps: u32,
        #[serde(default = "default_size")]
        radius: f32,
    },
    Quad {
        #[serde(default = "default_size")]
        size: f32,
    },
}

fn default_steps() -> u32 {
    32
}

fn default_size() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct InstanceEntry {
    shape: usize,
    material: usize,
    frame: Option<Mat4>,
    #[serde(default)]
    translation: Vec3,
    #[serde(default = "default_size")]
    scale: f32,
}

impl CameraEntry {
    fn into_camera(self) -> Camera {
        match self.lookat {
            Some(LookAt { from, to, up }) => Camera {
                frame: glint_math::lookat_frame(from, to, up),
                ..self.camera
            },
            None => self.camera,
        }
    }
}

impl ShapeEntry {
    fn into_shape(self) -> Shape {
        match self {
            ShapeEntry::Generated {
                generator: Generator::Sphere { steps, radius },
            } => Shape::uv_sphere(steps, radius),
            ShapeEntry::Generated {
                generator: Generator::Quad { size },
            } => Shape::quad(size),
            ShapeEntry::Inline(shape) => shape,
        }
    }
}

impl InstanceEntry {
    fn into_instance(self) -> Instance {
        let frame = self.frame.unwrap_or_else(|| {
            Mat4::from_scale_rotation_translation(
                Vec3::splat(self.scale),
                Default::default(),
                self.translation,
            )
        });
        Instance::new(frame, self.shape, self.material)
    }
}

impl Scene {
    /// Parse a scene from JSON. Texture paths are resolved against the
    /// current directory.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        Self::from_json_in(json, Path::new("."))
    }

    /// Parse a scene from JSON, resolving texture paths against `base_dir`.
    pub fn from_json_in(json: &str, base_dir: &Path) -> SceneResult<Self> {
        let file: SceneFile = serde_json::from_str(json)?;

        let textures = file
            .textures
            .iter()
            .map(|entry| Texture::load(&base_dir.join(&entry.path)))
            .collect::<Result<Vec<_>, _>>()?;

        let scene = Scene {
            cameras: file.cameras.into_iter().map(CameraEntry::into_camera).collect(),
            instances: file
                .instances
                .into_iter()
                .map(InstanceEntry::into_instance)
                .collect(),
            shapes: file.shapes.into_iter().map(ShapeEntry::into_shape).collect(),
            materials: file.materials,
            textures,
            environments: file.environments,
        };
        scene.validate()?;

        log::info!(
            "Loaded scene: {} cameras, {} shapes, {} instances, {} materials, {} textures",
            scene.cameras.len(),
            scene.shapes.len(),
            scene.instances.len(),
            scene.materials.len(),
            scene.textures.len()
        );
        Ok(scene)
    }

    /// Load a scene file. Texture paths are relative to the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json_in(&json, base_dir)
    }

    /// Check that every index stored in the scene refers to an existing item.
    pub fn validate(&self) -> SceneResult<()> {
        for (i, inst) in self.instances.iter().enumerate() {
            if inst.shape >= self.shapes.len() {
                return Err(SceneError::InvalidReference(format!(
                    "instance {} uses shape {} of {}",
                    i,
                    inst.shape,
                    self.shapes.len()
                )));
            }
            if inst.material >= self.materials.len() {
                return Err(SceneError::InvalidReference(format!(
                    "instance {} uses material {} of {}",
                    i,
                    inst.material,
                    self.materials.len()
                )));
            }
        }

        for (i, shape) in self.shapes.iter().enumerate() {
            if let Some(max) = shape.max_vertex_index() {
                if max as usize >= shape.positions.len() {
                    return Err(SceneError::InvalidReference(format!(
                        "shape {} indexes vertex {} of {}",
                        i,
                        max,
                        shape.positions.len()
                    )));
                }
            }
        }

        let material_textures = self
            .materials
            .iter()
            .enumerate()
            .flat_map(|(i, m)| m.textures().map(move |t| (format!("material {}", i), t)));
        let environment_textures = self
            .environments
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.emission_tex.map(|t| (format!("environment {}", i), t)));
        for (owner, texture) in material_textures.chain(environment_textures) {
            if texture >= self.textures.len() {
                return Err(SceneError::InvalidReference(format!(
                    "{} uses texture {} of {}",
                    owner,
                    texture,
                    self.textures.len()
                )));
            }
        }

        if self.cameras.is_empty() {
            log::warn!("Scene has no cameras");
        }
        Ok(())
    }
}
