//! Surface materials.

use glint_math::Vec3;
use serde::Deserialize;

/// Color type alias (linear RGB)
pub type Color = Vec3;

/// Material model tag.
///
/// The tracer transports light for the first five kinds. The remaining kinds
/// are accepted by the scene format and shade as emission only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    #[default]
    Matte,
    Glossy,
    Reflective,
    Transparent,
    Refractive,
    Subsurface,
    Volumetric,
    #[serde(rename = "gltfpbr")]
    GltfPbr,
}

/// A material definition.
///
/// Texture fields are indices into `Scene::textures`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    pub kind: MaterialKind,
    /// Base color (albedo or specular tint, depending on the kind)
    pub color: Color,
    /// Emitted radiance
    pub emission: Color,
    /// Roughness (0 = perfectly smooth)
    pub roughness: f32,
    /// Opacity (0 = invisible, 1 = opaque)
    pub opacity: f32,

    pub color_tex: Option<usize>,
    pub emission_tex: Option<usize>,
    pub roughness_tex: Option<usize>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Matte,
            color: Color::splat(0.8),
            emission: Color::ZERO,
            roughness: 0.0,
            opacity: 1.0,
            color_tex: None,
            emission_tex: None,
            roughness_tex: None,
        }
    }
}

impl Material {
    /// Create a material of the given kind and color.
    pub fn new(kind: MaterialKind, color: Color) -> Self {
        Self {
            kind,
            color,
            ..Default::default()
        }
    }

    pub fn matte(color: Color) -> Self {
        Self::new(MaterialKind::Matte, color)
    }

    /// Black emitter.
    pub fn emissive(emission: Color) -> Self {
        Self {
            color: Color::ZERO,
            emission,
            ..Default::default()
        }
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_color_tex(mut self, texture: usize) -> Self {
        self.color_tex = Some(texture);
        self
    }

    /// Check if this material is emissive.
    pub fn is_emissive(&self) -> bool {
        self.emission != Color::ZERO
    }

    /// Texture indices referenced by this material.
    pub fn textures(&self) -> impl Iterator<Item = usize> {
        [self.color_tex, self.emission_tex, self.roughness_tex]
            .into_iter()
            .flatten()
    }
}

/// A material resolved at a surface point, after texture lookups.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialPoint {
    pub kind: MaterialKind,
    pub color: Color,
    pub emission: Color,
    pub roughness: f32,
    pub opacity: f32,
}

impl Default for MaterialPoint {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Matte,
            color: Color::ZERO,
            emission: Color::ZERO,
            roughness: 0.0,
            opacity: 1.0,
        }
    }
}
