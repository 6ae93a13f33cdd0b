//! Physically based path tracing shader.

use glint_math::{Ray, Vec3};
use glint_scene::{Color, MaterialKind, MaterialPoint, Scene, ShapeKind};
use rand::RngCore;

use crate::bvh::Intersector;
use crate::params::RenderParams;
use crate::primitive::Intersection;
use crate::sampling::{
    fresnel_schlick, orthonormalize, rand1f, rand2f, reflect, refract, sample_hemisphere_cos,
    sample_hemisphere_cospower,
};

/// Relative index of refraction when entering a refractive surface.
const ETA_ENTERING: f32 = 0.58;

/// Specular reflectance of dielectric coatings at normal incidence.
const DIELECTRIC_SPECULAR: f32 = 0.04;

/// Continuation of a path at a surface vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    /// Direction of the next path segment
    pub incoming: Vec3,
    /// Throughput multiplier for the next segment
    pub weight: Color,
}

/// Trace a path and return its radiance estimate.
///
/// Path vertices are walked in a loop carrying the accumulated radiance and
/// throughput; every random draw comes from `rng` in path order.
pub(crate) fn shade_raytrace(
    scene: &Scene,
    bvh: &dyn Intersector,
    ray: &Ray,
    bounce: u32,
    rng: &mut dyn RngCore,
    params: &RenderParams,
) -> Color {
    let mut radiance = Color::ZERO;
    let mut weight = Color::ONE;
    let mut ray = *ray;
    let mut bounce = bounce;

    loop {
        let Some(isec) = bvh.intersect(&ray) else {
            return radiance + weight * scene.eval_environment(ray.direction);
        };

        let outgoing = -ray.direction;
        let position = scene.eval_position(isec.instance, isec.element, isec.uv);
        let material = scene.eval_material(isec.instance, isec.element, isec.uv);
        let normal = shading_normal(scene, &isec, outgoing, material.kind);

        // Stochastic transparency
        if rand1f(rng) < 1.0 - material.opacity {
            ray = Ray::new(position, ray.direction);
            bounce += 1;
            continue;
        }

        radiance += weight * material.emission;
        if bounce >= params.bounces {
            return radiance;
        }

        let Some(next) = scatter(&material, normal, outgoing, rng) else {
            return radiance;
        };
        weight *= next.weight;
        ray = Ray::new(position, next.incoming);
        bounce += 1;
    }
}

/// Normal used for shading at a hit.
///
/// Points face the viewer, lines use the direction toward the viewer
/// orthogonal to their tangent, and triangles are flipped toward the viewer
/// except for refractive materials, which need the outward side.
fn shading_normal(
    scene: &Scene,
    isec: &Intersection,
    outgoing: Vec3,
    kind: MaterialKind,
) -> Vec3 {
    let normal = scene.eval_normal(isec.instance, isec.element, isec.uv);
    match scene.instance_shape(isec.instance).kind() {
        ShapeKind::Points => outgoing,
        ShapeKind::Lines => orthonormalize(outgoing, normal),
        ShapeKind::Triangles if kind != MaterialKind::Refractive && normal.dot(outgoing) < 0.0 => {
            -normal
        }
        ShapeKind::Triangles | ShapeKind::Empty => normal,
    }
}

/// Sample the next path direction for a material.
///
/// Returns `None` for materials that only emit.
pub(crate) fn scatter(
    material: &MaterialPoint,
    normal: Vec3,
    outgoing: Vec3,
    rng: &mut dyn RngCore,
) -> Option<Scatter> {
    let dielectric = Color::splat(DIELECTRIC_SPECULAR);

    let next = match material.kind {
        MaterialKind::Matte => Scatter {
            incoming: sample_hemisphere_cos(normal, rand2f(rng)),
            weight: material.color,
        },

        MaterialKind::Reflective if material.roughness == 0.0 => Scatter {
            incoming: reflect(outgoing, normal),
            weight: fresnel_schlick(material.color, normal, outgoing),
        },

        MaterialKind::Reflective => {
            let exponent = 2.0 / (material.roughness * material.roughness);
            let halfway = sample_hemisphere_cospower(exponent, normal, rand2f(rng));
            Scatter {
                incoming: reflect(outgoing, halfway),
                weight: fresnel_schlick(material.color, halfway, outgoing),
            }
        }

        MaterialKind::Glossy => {
            let exponent = 2.0 / (material.roughness * material.roughness);
            let halfway = sample_hemisphere_cospower(exponent, normal, rand2f(rng));
            let fresnel = fresnel_schlick(dielectric, halfway, outgoing);
            if rand1f(rng) < fresnel.x {
                Scatter {
                    incoming: reflect(outgoing, halfway),
                    weight: Color::ONE,
                }
            } else {
                Scatter {
                    incoming: sample_hemisphere_cos(normal, rand2f(rng)),
                    weight: material.color,
                }
            }
        }

        MaterialKind::Transparent => {
            let fresnel = fresnel_schlick(dielectric, normal, outgoing);
            if rand1f(rng) < fresnel.x {
                Scatter {
                    incoming: reflect(outgoing, normal),
                    weight: Color::ONE,
                }
            } else {
                Scatter {
                    incoming: -outgoing,
                    weight: material.color,
                }
            }
        }

        MaterialKind::Refractive => {
            let fresnel = fresnel_schlick(dielectric, normal, outgoing);
            if rand1f(rng) < fresnel.x {
                Scatter {
                    incoming: reflect(outgoing, normal),
                    weight: Color::ONE,
                }
            } else {
                let (facing, eta) = if outgoing.dot(normal) >= 0.0 {
                    (normal, ETA_ENTERING)
                } else {
                    (-normal, 1.0 / ETA_ENTERING)
                };
                // Total internal reflection falls back to the mirror direction
                let incoming =
                    refract(outgoing, facing, eta).unwrap_or_else(|| reflect(outgoing, facing));
                Scatter {
                    incoming,
                    weight: material.color,
                }
            }
        }

        MaterialKind::Subsurface | MaterialKind::Volumetric | MaterialKind::GltfPbr => {
            return None;
        }
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::Bvh;
    use glint_math::{Mat4, Vec2};
    use glint_scene::{Environment, Material, Shape};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn point(kind: MaterialKind) -> MaterialPoint {
        MaterialPoint {
            kind,
            color: Color::new(0.5, 0.6, 0.7),
            ..Default::default()
        }
    }

    fn quad_scene(material: Material) -> Scene {
        let mut scene = Scene::new();
        let shape = scene.add_shape(Shape::quad(4.0));
        let material = scene.add_material(material);
        scene.add_instance(Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0)), shape, material);
        scene.add_environment(Environment::constant(Color::new(0.1, 0.2, 0.3)));
        scene
    }

    fn forward() -> Ray {
        Ray::new(Vec3::new(0.3, -0.2, 0.0), -Vec3::Z)
    }

    #[test]
    fn test_miss_returns_environment() {
        let scene = quad_scene(Material::default());
        let bvh = Bvh::build(&scene);
        let params = RenderParams::default();
        let mut rng = Pcg32::seed_from_u64(1);

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let radiance = shade_raytrace(&scene, &bvh, &ray, 0, &mut rng, &params);
        assert_eq!(radiance, Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_emission_at_depth_limit() {
        let scene = quad_scene(Material::emissive(Color::new(2.0, 3.0, 4.0)));
        let bvh = Bvh::build(&scene);
        let params = RenderParams::default().with_quality(1, 0);

        for seed in 0..16 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let radiance = shade_raytrace(&scene, &bvh, &forward(), 0, &mut rng, &params);
            assert_eq!(radiance, Color::new(2.0, 3.0, 4.0));
        }
    }

    #[test]
    fn test_invisible_surface_is_skipped() {
        let scene = quad_scene(Material::emissive(Color::ONE).with_opacity(0.0));
        let bvh = Bvh::build(&scene);
        let params = RenderParams::default();
        let mut rng = Pcg32::seed_from_u64(5);

        let radiance = shade_raytrace(&scene, &bvh, &forward(), 0, &mut rng, &params);
        assert_eq!(radiance, Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_matte_scatter() {
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..100 {
            let next = scatter(&point(MaterialKind::Matte), Vec3::Z, Vec3::Z, &mut rng).unwrap();
            assert!(next.incoming.z >= 0.0);
            assert_eq!(next.weight, Color::new(0.5, 0.6, 0.7));
        }
    }

    #[test]
    fn test_mirror_scatter() {
        let mut rng = Pcg32::seed_from_u64(9);
        let outgoing = Vec3::new(1.0, 0.0, 1.0).normalize();
        let next = scatter(&point(MaterialKind::Reflective), Vec3::Z, outgoing, &mut rng).unwrap();

        assert!((next.incoming - Vec3::new(-1.0, 0.0, 1.0).normalize()).length() < 1e-6);
        let expected = fresnel_schlick(Color::new(0.5, 0.6, 0.7), Vec3::Z, outgoing);
        assert_eq!(next.weight, expected);
    }

    #[test]
    fn test_glossy_mixes_specular_and_diffuse() {
        let material = MaterialPoint {
            roughness: 0.2,
            ..point(MaterialKind::Glossy)
        };
        let mut rng = Pcg32::seed_from_u64(17);
        let mut specular = 0;
        for _ in 0..2000 {
            let next = scatter(&material, Vec3::Z, Vec3::Z, &mut rng).unwrap();
            assert!((next.incoming.length() - 1.0).abs() < 1e-4);
            if next.weight == Color::ONE {
                specular += 1;
            } else {
                assert_eq!(next.weight, Color::new(0.5, 0.6, 0.7));
                assert!(next.incoming.z >= 0.0);
            }
        }
        // Roughly 4% dielectric reflectance head-on
        assert!((30..=150).contains(&specular), "specular draws: {}", specular);
    }

    #[test]
    fn test_rough_reflection_follows_sampled_halfway() {
        let material = MaterialPoint {
            roughness: 0.3,
            ..point(MaterialKind::Reflective)
        };
        let outgoing = Vec3::Z;
        let mut rng = Pcg32::seed_from_u64(23);
        let mut mean = Vec3::ZERO;
        let mut distinct = false;
        for _ in 0..500 {
            let next = scatter(&material, Vec3::Z, outgoing, &mut rng).unwrap();
            assert!((next.incoming.length() - 1.0).abs() < 1e-4);

            let halfway = (next.incoming + outgoing).normalize();
            assert!(halfway.z > 0.0);
            let expected = fresnel_schlick(material.color, halfway, outgoing);
            assert!((next.weight - expected).length() < 1e-3);

            distinct |= (next.incoming - Vec3::Z).length() > 1e-3;
            mean += next.incoming;
        }
        // A lobe around the mirror direction, not the mirror direction itself
        assert!(distinct);
        assert!((mean / 500.0).z > 0.7);
    }

    fn shape_scene(shape: Shape, material: Material) -> Scene {
        let mut scene = Scene::new();
        let shape = scene.add_shape(shape);
        let material = scene.add_material(material);
        scene.add_instance(Mat4::IDENTITY, shape, material);
        scene
    }

    fn hit(element: usize, uv: Vec2) -> Intersection {
        Intersection {
            instance: 0,
            element,
            uv,
            distance: 1.0,
        }
    }

    #[test]
    fn test_triangle_normals_face_viewer_unless_refractive() {
        let uv = Vec2::new(0.25, 0.25);
        let back = -Vec3::Z;

        let matte = shape_scene(Shape::quad(2.0), Material::default());
        let n = shading_normal(&matte, &hit(0, uv), back, MaterialKind::Matte);
        assert!((n - -Vec3::Z).length() < 1e-6);
        let n = shading_normal(&matte, &hit(0, uv), Vec3::Z, MaterialKind::Matte);
        assert!((n - Vec3::Z).length() < 1e-6);

        let refractive = Material::new(MaterialKind::Refractive, Color::ONE);
        let glass = shape_scene(Shape::quad(2.0), refractive);
        let n = shading_normal(&glass, &hit(0, uv), back, MaterialKind::Refractive);
        assert!((n - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_point_normal_faces_viewer() {
        let scene = shape_scene(Shape::point_cloud(vec![Vec3::ZERO], 0.1), Material::default());
        let outgoing = Vec3::new(1.0, 2.0, -2.0).normalize();

        let n = shading_normal(&scene, &hit(0, Vec2::ZERO), outgoing, MaterialKind::Matte);
        assert_eq!(n, outgoing);
    }

    #[test]
    fn test_line_normal_is_orthogonal_to_tangent() {
        let line = Shape::polyline(vec![Vec3::ZERO, Vec3::X], 0.1);
        let scene = shape_scene(line, Material::default());
        let outgoing = Vec3::new(1.0, 0.0, 1.0).normalize();

        let isec = hit(0, Vec2::new(0.5, 0.0));
        let n = shading_normal(&scene, &isec, outgoing, MaterialKind::Matte);
        assert!((n - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_transparent_passes_through() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut transmitted = 0;
        for _ in 0..200 {
            let next = scatter(&point(MaterialKind::Transparent), Vec3::Z, Vec3::Z, &mut rng).unwrap();
            if next.incoming == -Vec3::Z {
                transmitted += 1;
                assert_eq!(next.weight, Color::new(0.5, 0.6, 0.7));
            } else {
                assert_eq!(next.incoming, Vec3::Z);
                assert_eq!(next.weight, Color::ONE);
            }
        }
        // Head-on Fresnel reflectance is 4%
        assert!(transmitted > 170);
    }

    #[test]
    fn test_refractive_enters_and_exits() {
        let material = point(MaterialKind::Refractive);
        let mut rng = Pcg32::seed_from_u64(11);
        let outgoing = Vec3::new(0.3, 0.0, 1.0).normalize();

        for _ in 0..100 {
            // From outside: transmitted rays go below the surface
            let next = scatter(&material, Vec3::Z, outgoing, &mut rng).unwrap();
            if next.weight != Color::ONE {
                assert!(next.incoming.z < 0.0);
            }

            // From inside: the outward normal faces away from the viewer
            let next = scatter(&material, -Vec3::Z, outgoing, &mut rng).unwrap();
            if next.weight != Color::ONE {
                assert!(next.incoming.z < 0.0);
                assert!((next.incoming.length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_emission_only_kinds() {
        let mut rng = Pcg32::seed_from_u64(0);
        for kind in [MaterialKind::Subsurface, MaterialKind::Volumetric, MaterialKind::GltfPbr] {
            assert!(scatter(&point(kind), Vec3::Z, Vec3::Z, &mut rng).is_none());
        }
    }
}
