//! Sampling and shading helpers shared by the shaders.

use std::f32::consts::PI;

use glint_math::{Vec2, Vec3};
use glint_scene::Color;
use rand::Rng;

/// Uniform float in [0, 1).
#[inline]
pub fn rand1f<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>()
}

/// Two uniform floats in [0, 1), drawn x first.
#[inline]
pub fn rand2f<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let x = rand1f(rng);
    let y = rand1f(rng);
    Vec2::new(x, y)
}

/// Express a local direction (z up) in the frame around `normal`.
fn to_world(normal: Vec3, local: Vec3) -> Vec3 {
    let (tangent, bitangent) = normal.any_orthonormal_pair();
    tangent * local.x + bitangent * local.y + normal * local.z
}

/// Cosine-weighted direction on the hemisphere around `normal`.
pub fn sample_hemisphere_cos(normal: Vec3, ruv: Vec2) -> Vec3 {
    let z = ruv.y.sqrt();
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * ruv.x;
    to_world(normal, Vec3::new(r * phi.cos(), r * phi.sin(), z))
}

/// Direction on the hemisphere around `normal` with density ~ cos^exponent.
pub fn sample_hemisphere_cospower(exponent: f32, normal: Vec3, ruv: Vec2) -> Vec3 {
    let z = ruv.y.powf(1.0 / (exponent + 1.0));
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * ruv.x;
    to_world(normal, Vec3::new(r * phi.cos(), r * phi.sin(), z))
}

/// Schlick's approximation of Fresnel reflectance.
///
/// Black specular stays black.
pub fn fresnel_schlick(specular: Color, normal: Vec3, outgoing: Vec3) -> Color {
    if specular == Color::ZERO {
        return Color::ZERO;
    }
    let cosine = normal.dot(outgoing).abs();
    let weight = (1.0 - cosine).clamp(0.0, 1.0).powi(5);
    specular + (Color::ONE - specular) * weight
}

/// Mirror `w` about `n`. Both point away from the surface.
#[inline]
pub fn reflect(w: Vec3, n: Vec3) -> Vec3 {
    -w + 2.0 * n.dot(w) * n
}

/// Refract `w` (pointing away from the surface on the side of `n`) with
/// relative index `inv_eta`. `None` on total internal reflection.
pub fn refract(w: Vec3, n: Vec3, inv_eta: f32) -> Option<Vec3> {
    let cosine = n.dot(w);
    let k = 1.0 + inv_eta * inv_eta * (cosine * cosine - 1.0);
    if k < 0.0 {
        return None;
    }
    Some(-w * inv_eta + (inv_eta * cosine - k.sqrt()) * n)
}

/// Component of `a` orthogonal to `b`, normalized.
#[inline]
pub fn orthonormalize(a: Vec3, b: Vec3) -> Vec3 {
    (a - b * a.dot(b)).normalize_or_zero()
}

/// Hermite step between `a` and `b`.
#[inline]
pub fn smoothstep(a: f32, b: f32, x: f32) -> f32 {
    let t = ((x - a) / (b - a)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
