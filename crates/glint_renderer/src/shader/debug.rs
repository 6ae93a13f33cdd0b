//! Visualization shaders. None of these recurse; all return black on a miss.

use glint_math::{Ray, Vec3};
use glint_scene::{Color, Scene};
use rand::RngCore;

use crate::bvh::Intersector;
use crate::sampling::{rand1f, reflect, smoothstep};

// Cel shading setup
const CEL_LIGHT: Vec3 = Vec3::new(0.4, 0.8, 0.8);
const CEL_LIGHT_COLOR: Color = Color::new(0.85, 0.85, 0.5);
const CEL_LIGHT_INTENSITY: f32 = 0.8;
const CEL_AMBIENT: f32 = 0.4;
const CEL_SPECULAR: f32 = 0.9;
const CEL_GLOSSINESS: i32 = 32;
const CEL_RIM_AMOUNT: f32 = 0.716;
const CEL_RIM_THRESHOLD: f32 = 0.1;

pub(crate) fn shade_matte() -> Color {
    Color::ZERO
}

pub(crate) fn shade_eyelight(scene: &Scene, bvh: &dyn Intersector, ray: &Ray) -> Color {
    let Some(isec) = bvh.intersect(ray) else {
        return Color::ZERO;
    };
    let normal = scene.eval_normal(isec.instance, isec.element, isec.uv);
    let material = scene.eval_material(isec.instance, isec.element, isec.uv);
    material.color * normal.dot(-ray.direction).max(0.0)
}

pub(crate) fn shade_normal(scene: &Scene, bvh: &dyn Intersector, ray: &Ray) -> Color {
    let Some(isec) = bvh.intersect(ray) else {
        return Color::ZERO;
    };
    let normal = scene.eval_normal(isec.instance, isec.element, isec.uv);
    normal * 0.5 + 0.5
}

pub(crate) fn shade_texcoord(scene: &Scene, bvh: &dyn Intersector, ray: &Ray) -> Color {
    let Some(isec) = bvh.intersect(ray) else {
        return Color::ZERO;
    };
    let texcoord = scene.eval_texcoord(isec.instance, isec.element, isec.uv);
    Color::new(texcoord.x.rem_euclid(1.0), texcoord.y.rem_euclid(1.0), 0.0)
}

pub(crate) fn shade_color(scene: &Scene, bvh: &dyn Intersector, ray: &Ray) -> Color {
    let Some(isec) = bvh.intersect(ray) else {
        return Color::ZERO;
    };
    scene.eval_material(isec.instance, isec.element, isec.uv).color
}

/// Material color modulated by a view-dependent matcap ramp.
///
/// Element 0 of every shape is drawn flat.
pub(crate) fn shade_matcap(scene: &Scene, bvh: &dyn Intersector, ray: &Ray) -> Color {
    let Some(isec) = bvh.intersect(ray) else {
        return Color::ZERO;
    };
    let material = scene.eval_material(isec.instance, isec.element, isec.uv);
    if isec.element == 0 {
        return material.color;
    }

    let normal = scene.eval_normal(isec.instance, isec.element, isec.uv);
    let r = reflect(-ray.direction, normal);
    let m = 2.0 * (r.x * r.x + r.y * r.y + (r.z + 1.0) * (r.z + 1.0)).sqrt();
    let ramp = (r.x + r.y + r.z) / m + 0.5;
    material.color * ramp
}

/// Toon shading from a fixed key light, with a stochastic shadow term.
///
/// Element 0 of every shape gets the key light only.
pub(crate) fn shade_cellshading(
    scene: &Scene,
    bvh: &dyn Intersector,
    ray: &Ray,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(isec) = bvh.intersect(ray) else {
        return Color::ZERO;
    };
    let position = scene.eval_position(isec.instance, isec.element, isec.uv);
    let normal = scene.eval_normal(isec.instance, isec.element, isec.uv);
    let material = scene.eval_material(isec.instance, isec.element, isec.uv);

    let light_dir = CEL_LIGHT.normalize();
    let light = CEL_LIGHT_COLOR * CEL_LIGHT_INTENSITY;

    let mut shadow = 1.0;
    if let Some(blocker) = bvh.intersect(&Ray::new(position, light_dir)) {
        let occluder = scene.eval_material(blocker.instance, blocker.element, blocker.uv);
        if occluder.emission == Color::ZERO {
            shadow = rand1f(rng);
        }
    }

    if isec.element == 0 {
        return material.color * light * shadow;
    }

    let halfway = (light_dir - ray.direction).normalize();
    let highlight = (normal.dot(halfway) * CEL_LIGHT_INTENSITY).powi(CEL_GLOSSINESS * CEL_GLOSSINESS);
    let specular = smoothstep(0.005, 0.1, highlight) * CEL_SPECULAR;

    let rim_dot = 1.0 - (-ray.direction).dot(normal);
    let rim_intensity = rim_dot * light_dir.dot(normal).max(0.0).powf(CEL_RIM_THRESHOLD);
    let rim = smoothstep(CEL_RIM_AMOUNT - 0.01, CEL_RIM_AMOUNT + 0.01, rim_intensity);

    material.color * (light * shadow + CEL_AMBIENT + specular + rim)
}
