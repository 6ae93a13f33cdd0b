//! Glint math types.
//!
//! Re-exports glam and adds the small set of ray tracing primitives the
//! scene and renderer crates share.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::{Ray, RAY_EPS};
pub use transform::{lookat_frame, Mat4Ext};
