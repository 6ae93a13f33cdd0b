//! Scene container and surface evaluation.
//!
//! Evaluation functions take an instance index plus the element index and
//! local `uv` produced by ray intersection, and return world-space values.

use glint_math::{Aabb, Mat4, Mat4Ext, Vec2, Vec3};
use serde::Deserialize;

use crate::camera::Camera;
use crate::environment::Environment;
use crate::material::{Color, Material, MaterialPoint};
use crate::shape::Shape;
use crate::texture::Texture;

/// A shape placed in the world with a material.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Instance {
    /// Local-to-world frame
    pub frame: Mat4,
    /// Index into `Scene::shapes`
    pub shape: usize,
    /// Index into `Scene::materials`
    pub material: usize,
}

impl Instance {
    pub fn new(frame: Mat4, shape: usize, material: usize) -> Self {
        Self {
            frame,
            shape,
            material,
        }
    }
}

/// A complete scene.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub cameras: Vec<Camera>,
    pub instances: Vec<Instance>,
    pub shapes: Vec<Shape>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub environments: Vec<Environment>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a camera and return its index.
    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    /// Add a shape and return its index.
    pub fn add_shape(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add a texture and return its index.
    pub fn add_texture(&mut self, texture: Texture) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    /// Place a shape in the world and return the instance index.
    pub fn add_instance(&mut self, frame: Mat4, shape: usize, material: usize) -> usize {
        self.instances.push(Instance::new(frame, shape, material));
        self.instances.len() - 1
    }

    pub fn add_environment(&mut self, environment: Environment) -> usize {
        self.environments.push(environment);
        self.environments.len() - 1
    }

    /// Shape referenced by an instance.
    pub fn instance_shape(&self, instance: usize) -> &Shape {
        &self.shapes[self.instances[instance].shape]
    }

    /// World-space position on an instance element.
    pub fn eval_position(&self, instance: usize, element: usize, uv: Vec2) -> Vec3 {
        let inst = &self.instances[instance];
        let local = self.shapes[inst.shape].eval_position(element, uv);
        inst.frame.transform_point3(local)
    }

    /// World-space shading normal on an instance element.
    pub fn eval_normal(&self, instance: usize, element: usize, uv: Vec2) -> Vec3 {
        let inst = &self.instances[instance];
        let local = self.shapes[inst.shape].eval_normal(element, uv);
        inst.frame.transform_normal(local)
    }

    /// Texture coordinates on an instance element.
    pub fn eval_texcoord(&self, instance: usize, element: usize, uv: Vec2) -> Vec2 {
        let inst = &self.instances[instance];
        self.shapes[inst.shape].eval_texcoord(element, uv)
    }

    /// Resolve the instance material at a surface point.
    ///
    /// Constant values are scaled by their textures: color by the color
    /// texture's RGB, opacity by its alpha, emission by the emission texture
    /// and roughness by the first channel of the roughness texture.
    pub fn eval_material(&self, instance: usize, element: usize, uv: Vec2) -> MaterialPoint {
        let inst = &self.instances[instance];
        let material = &self.materials[inst.material];
        let texcoord = self.eval_texcoord(instance, element, uv);

        let lookup = |texture: Option<usize>| {
            texture
                .and_then(|index| self.textures.get(index))
                .map(|tex| tex.sample(texcoord))
        };

        let color_tex = lookup(material.color_tex);
        let emission_tex = lookup(material.emission_tex);
        let roughness_tex = lookup(material.roughness_tex);

        MaterialPoint {
            kind: material.kind,
            color: material.color * color_tex.map_or(Color::ONE, |t| t.truncate()),
            emission: material.emission * emission_tex.map_or(Color::ONE, |t| t.truncate()),
            roughness: material.roughness * roughness_tex.map_or(1.0, |t| t.x),
            opacity: material.opacity * color_tex.map_or(1.0, |t| t.w),
        }
    }

    /// Radiance arriving from the environments along a world direction.
    pub fn eval_environment(&self, direction: Vec3) -> Color {
        self.environments
            .iter()
            .map(|env| {
                let texture = env.emission_tex.and_then(|index| self.textures.get(index));
                match texture {
                    Some(tex) => env.emission * tex.sample(env.texcoord(direction)).truncate(),
                    None => env.emission,
                }
            })
            .sum()
    }

    /// World-space bounds of all instances.
    pub fn world_bounds(&self) -> Aabb {
        self.instances.iter().fold(Aabb::EMPTY, |acc, inst| {
            let local = self.shapes[inst.shape].bounds();
            Aabb::surrounding(&acc, &inst.frame.transform_aabb(&local))
        })
    }

    /// Total element count across all instances.
    pub fn element_count(&self) -> usize {
        self.instances
            .iter()
            .map(|inst| self.shapes[inst.shape].element_count())
            .sum()
    }
}
