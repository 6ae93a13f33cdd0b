//! Built-in demo scene.

use std::f32::consts::FRAC_PI_2;

use glint_math::{Mat4, Quat, Vec3};
use glint_scene::{Camera, Color, Environment, Material, MaterialKind, Scene, Shape};

const KINDS: [MaterialKind; 8] = [
    MaterialKind::Matte,
    MaterialKind::Glossy,
    MaterialKind::Reflective,
    MaterialKind::Transparent,
    MaterialKind::Refractive,
    MaterialKind::Subsurface,
    MaterialKind::Volumetric,
    MaterialKind::GltfPbr,
];

/// A row of spheres, one per material kind, on a floor under an area light.
pub fn demo_scene() -> Scene {
    let mut scene = Scene::new();
    scene.add_camera(Camera::look_at(
        Vec3::new(0.0, 2.5, 9.0),
        Vec3::new(0.0, 0.5, 0.0),
        Vec3::Y,
    ));

    let sphere = scene.add_shape(Shape::uv_sphere(48, 0.45));
    let quad = scene.add_shape(Shape::quad(1.0));

    let spacing = 1.1;
    let offset = spacing * (KINDS.len() - 1) as f32 / 2.0;
    for (i, kind) in KINDS.into_iter().enumerate() {
        let hue = i as f32 / KINDS.len() as f32;
        let color = Color::new(0.9 - 0.5 * hue, 0.4 + 0.3 * hue, 0.2 + 0.6 * hue);
        let roughness = if kind == MaterialKind::Glossy { 0.3 } else { 0.05 };
        let material = Material::new(kind, color).with_roughness(roughness);
        let material = scene.add_material(material);
        let frame = Mat4::from_translation(Vec3::new(i as f32 * spacing - offset, 0.45, 0.0));
        scene.add_instance(frame, sphere, material);
    }

    let floor = scene.add_material(Material::matte(Color::splat(0.6)));
    scene.add_instance(
        Mat4::from_scale_rotation_translation(
            Vec3::splat(30.0),
            Quat::from_rotation_x(-FRAC_PI_2),
            Vec3::ZERO,
        ),
        quad,
        floor,
    );

    let light = scene.add_material(Material::emissive(Color::splat(8.0)));
    scene.add_instance(
        Mat4::from_scale_rotation_translation(
            Vec3::new(4.0, 1.5, 1.0),
            Quat::from_rotation_x(FRAC_PI_2),
            Vec3::new(0.0, 4.0, 1.0),
        ),
        quad,
        light,
    );

    scene.add_environment(Environment::constant(Color::new(0.15, 0.18, 0.25)));
    scene
}
