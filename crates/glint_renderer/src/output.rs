//! Output images and render extraction.

use std::path::Path;

use glint_math::Vec4;

use crate::error::{RenderError, RenderResult};
use crate::state::RenderState;

/// RGBA float image.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorImage {
    pub width: u32,
    pub height: u32,
    /// Pixels hold linear radiance rather than display values
    pub linear: bool,
    /// Row-major pixels, first row at the top
    pub pixels: Vec<Vec4>,
}

impl ColorImage {
    /// Create a new image filled with black.
    pub fn new(width: u32, height: u32, linear: bool) -> Self {
        Self {
            width,
            height,
            linear,
            pixels: vec![Vec4::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Vec4) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Convert to 8-bit RGBA. Linear images are sRGB-encoded first.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            let rgb = pixel.truncate();
            let rgb = if self.linear { rgb.to_array().map(linear_to_srgb) } else { rgb.to_array() };
            bytes.extend(rgb.map(to_byte));
            bytes.push(to_byte(pixel.w));
        }
        bytes
    }

    /// Write the image as an 8-bit PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let path = path.as_ref();
        image::save_buffer_with_format(
            path,
            &self.to_rgba8(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// sRGB transfer curve.
#[inline]
fn linear_to_srgb(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Average the accumulated samples into a new linear image.
pub fn extract_image(state: &RenderState) -> ColorImage {
    let mut image = ColorImage::new(state.width, state.height, true);
    fill_average(&mut image, state);
    image
}

/// Average the accumulated samples into an existing image.
///
/// The image must be linear and match the state's size.
pub fn extract_image_into(image: &mut ColorImage, state: &RenderState) -> RenderResult<()> {
    if image.width != state.width || image.height != state.height {
        return Err(RenderError::ImageSize {
            width: image.width,
            height: image.height,
            expected_width: state.width,
            expected_height: state.height,
        });
    }
    if !image.linear {
        return Err(RenderError::ImageColorSpace);
    }
    fill_average(image, state);
    Ok(())
}

fn fill_average(image: &mut ColorImage, state: &RenderState) {
    let scale = if state.samples == 0 {
        0.0
    } else {
        1.0 / state.samples as f32
    };
    for (pixel, radiance) in image.pixels.iter_mut().zip(&state.image) {
        *pixel = (*radiance * scale).extend(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RenderParams;
    use glint_scene::{Camera, Color, Scene};

    fn state() -> RenderState {
        let mut scene = Scene::new();
        scene.add_camera(Camera::default().with_aspect(2.0));
        RenderState::new(&scene, &RenderParams::default().with_resolution(4)).unwrap()
    }

    #[test]
    fn test_pixel_index_beyond_u32() {
        // Index math only; no pixels are allocated
        let image = ColorImage {
            width: 70_000,
            height: 70_000,
            linear: true,
            pixels: Vec::new(),
        };
        assert_eq!(image.index(1, 69_999), 69_999 * 70_000 + 1);
        assert!(image.index(1, 69_999) > u32::MAX as usize);
    }

    #[test]
    fn test_extract_zero_samples_is_black() {
        let image = extract_image(&state());
        assert_eq!((image.width, image.height), (4, 2));
        assert!(image.linear);
        assert!(image.pixels.iter().all(|p| *p == Vec4::new(0.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_extract_averages() {
        let mut state = state();
        state.samples = 4;
        state.image[3] = Color::new(4.0, 2.0, 1.0);

        let image = extract_image(&state);
        assert_eq!(image.get(3, 0), Vec4::new(1.0, 0.5, 0.25, 1.0));
        assert_eq!(image.get(0, 1), Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_extract_into_checks() {
        let state = state();

        let mut wrong_size = ColorImage::new(3, 2, true);
        assert!(matches!(
            extract_image_into(&mut wrong_size, &state),
            Err(RenderError::ImageSize { .. })
        ));

        let mut display = ColorImage::new(4, 2, false);
        assert_eq!(
            extract_image_into(&mut display, &state),
            Err(RenderError::ImageColorSpace)
        );

        let mut ok = ColorImage::new(4, 2, true);
        assert!(extract_image_into(&mut ok, &state).is_ok());
    }

    #[test]
    fn test_to_rgba8() {
        let mut image = ColorImage::new(2, 1, true);
        image.set(0, 0, Vec4::new(1.0, 0.0, 2.0, 1.0));
        image.set(1, 0, Vec4::new(0.5, -1.0, f32::NAN, 0.0));

        let bytes = image.to_rgba8();
        assert_eq!(&bytes[0..4], &[255, 0, 255, 255]);
        // Linear mid-gray encodes brighter than 128
        assert_eq!(bytes[4], 188);
        assert_eq!(bytes[5], 0);
        assert_eq!(bytes[7], 0);
    }

    #[test]
    fn test_linear_to_srgb() {
        assert_eq!(linear_to_srgb(0.0), 0.0);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-6);
    }
}
