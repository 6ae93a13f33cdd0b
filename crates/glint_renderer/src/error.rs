//! Render configuration errors.

use glint_scene::SceneError;
use thiserror::Error;

/// Errors reported before or after a render, never during a sample sweep.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unknown shader: {0}")]
    UnknownShader(String),

    #[error("Camera {index} out of range ({count} cameras in scene)")]
    CameraOutOfRange { index: usize, count: usize },

    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    #[error("Resolution must be greater than zero")]
    ZeroResolution,

    #[error("Image should have size {expected_width}x{expected_height}, got {width}x{height}")]
    ImageSize {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("Expected a linear image")]
    ImageColorSpace,
}

impl From<SceneError> for RenderError {
    fn from(err: SceneError) -> Self {
        RenderError::InvalidScene(err.to_string())
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
