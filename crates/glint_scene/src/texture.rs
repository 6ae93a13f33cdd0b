//! Image textures for material and environment lookups.
//!
//! Pixels are stored as linear float RGBA regardless of the source format.

use std::path::Path;

use glint_math::{Vec2, Vec3, Vec4};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {0} has no pixels")]
    Empty(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Linear RGBA pixels, row-major, first row at the top of the image
    pub pixels: Vec<Vec4>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec4>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self::new(1, 1, vec![color.extend(1.0)], "<solid>")
    }

    /// Load an image file.
    ///
    /// 8-bit images are treated as sRGB and linearized; float images
    /// (HDR, EXR) are kept as is.
    pub fn load(path: &Path) -> TextureResult<Self> {
        let display = path.display().to_string();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: display.clone(),
            source,
        })?;

        let is_float = matches!(
            img.color(),
            image::ColorType::Rgb32F | image::ColorType::Rgba32F
        );
        let rgba = img.to_rgba32f();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(display));
        }

        let pixels = rgba
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                if is_float {
                    Vec4::new(r, g, b, a)
                } else {
                    Vec4::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a)
                }
            })
            .collect();

        log::debug!("Loaded texture: {} ({}x{})", display, width, height);
        Ok(Self::new(width, height, pixels, display))
    }

    /// Sample the texture at UV coordinates with bilinear filtering.
    ///
    /// UVs wrap around; v = 0 is the bottom of the image.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        if self.pixels.is_empty() {
            return Vec4::ONE;
        }
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);

        let x = u * (self.width as f32 - 1.0);
        let y = (1.0 - v) * (self.height as f32 - 1.0);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let (fx, fy) = (x.fract(), y.fract());

        let top = self.get_pixel(x0, y0).lerp(self.get_pixel(x1, y0), fx);
        let bottom = self.get_pixel(x0, y1).lerp(self.get_pixel(x1, y1), fx);
        top.lerp(bottom, fy)
    }

    fn get_pixel(&self, x: u32, y: u32) -> Vec4 {
        let idx = (y * self.width + x) as usize;
        self.pixels.get(idx).copied().unwrap_or(Vec4::W)
    }
}

/// Convert an sRGB-encoded channel in [0,1] to linear.
fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(Vec3::new(1.0, 0.5, 0.0));

        let sample = tex.sample(Vec2::new(0.7, -3.2));
        assert!((sample - Vec4::new(1.0, 0.5, 0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_bilinear_sample() {
        // 2x1 texture: black on the left, white on the right
        let tex = Texture::new(2, 1, vec![Vec4::W, Vec4::ONE], "<test>");

        assert!((tex.sample(Vec2::new(0.0, 0.5)).x - 0.0).abs() < 1e-6);
        assert!((tex.sample(Vec2::new(0.5, 0.5)).x - 0.5).abs() < 1e-6);
        assert!((tex.sample(Vec2::new(0.999, 0.5)).x - 0.999).abs() < 1e-3);
    }

    #[test]
    fn test_vertical_flip() {
        // Top row red, bottom row blue
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let blue = Vec4::new(0.0, 0.0, 1.0, 1.0);
        let tex = Texture::new(1, 2, vec![red, blue], "<test>");

        assert_eq!(tex.sample(Vec2::new(0.0, 0.0)), blue);
        assert!(tex.sample(Vec2::new(0.0, 0.999_999)).x > 0.99);
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0.0) - 0.0).abs() < 1e-6);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);

        // Mid-gray is darker in linear
        let mid = srgb_to_linear(0.5);
        assert!(mid > 0.1 && mid < 0.5);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Texture::load(Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, TextureError::Load { .. }));
    }
}
