//! Surface shaders.
//!
//! One physically based path tracer (`raytrace`) and a set of
//! non-recursive visualization shaders. The shader is picked once per
//! render from a [`ShaderKind`].

mod debug;
mod raytrace;

use std::fmt;
use std::str::FromStr;

use glint_math::Ray;
use glint_scene::{Color, Scene};
use rand::RngCore;

use crate::bvh::Intersector;
use crate::error::RenderError;
use crate::params::RenderParams;

/// Available shaders, selected by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Raytrace,
    Matte,
    Eyelight,
    Normal,
    Texcoord,
    Color,
    Matcap,
    Cellshading,
}

impl ShaderKind {
    /// Every shader, in tag order.
    pub const ALL: [ShaderKind; 8] = [
        ShaderKind::Raytrace,
        ShaderKind::Matte,
        ShaderKind::Eyelight,
        ShaderKind::Normal,
        ShaderKind::Texcoord,
        ShaderKind::Color,
        ShaderKind::Matcap,
        ShaderKind::Cellshading,
    ];

    /// Configuration tag.
    pub fn name(self) -> &'static str {
        match self {
            ShaderKind::Raytrace => "raytrace",
            ShaderKind::Matte => "matte",
            ShaderKind::Eyelight => "eyelight",
            ShaderKind::Normal => "normal",
            ShaderKind::Texcoord => "texcoord",
            ShaderKind::Color => "color",
            ShaderKind::Matcap => "matcap",
            ShaderKind::Cellshading => "cellshading",
        }
    }

    /// Radiance arriving along `ray`, starting at path depth `bounce`.
    pub fn shade(
        self,
        scene: &Scene,
        bvh: &dyn Intersector,
        ray: &Ray,
        bounce: u32,
        rng: &mut dyn RngCore,
        params: &RenderParams,
    ) -> Color {
        match self {
            ShaderKind::Raytrace => raytrace::shade_raytrace(scene, bvh, ray, bounce, rng, params),
            ShaderKind::Matte => debug::shade_matte(),
            ShaderKind::Eyelight => debug::shade_eyelight(scene, bvh, ray),
            ShaderKind::Normal => debug::shade_normal(scene, bvh, ray),
            ShaderKind::Texcoord => debug::shade_texcoord(scene, bvh, ray),
            ShaderKind::Color => debug::shade_color(scene, bvh, ray),
            ShaderKind::Matcap => debug::shade_matcap(scene, bvh, ray),
            ShaderKind::Cellshading => debug::shade_cellshading(scene, bvh, ray, rng),
        }
    }
}

impl FromStr for ShaderKind {
    type Err = RenderError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ShaderKind::ALL
            .into_iter()
            .find(|kind| kind.name() == tag)
            .ok_or_else(|| RenderError::UnknownShader(tag.to_string()))
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
