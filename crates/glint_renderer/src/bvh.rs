//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! All instance elements are flattened into world-space primitives and
//! organized in a binary tree built once per scene.

use std::time::Instant;

use glint_math::{Aabb, Interval, Ray};
use glint_scene::{Scene, ShapeKind};

use crate::primitive::{frame_scale, Geometry, Intersection, Primitive};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Ray queries against scene geometry.
pub trait Intersector: Send + Sync {
    /// Nearest hit along the ray within its parameter range.
    fn intersect(&self, ray: &Ray) -> Option<Intersection>;
}

/// BVH node - either a branch with two children or a leaf with primitives.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of primitives.
    Leaf {
        primitives: Vec<Primitive>,
        bbox: Aabb,
    },
    /// Empty node (for edge cases).
    Empty,
}

impl BvhNode {
    /// Create a BVH from a list of primitives.
    pub fn new(primitives: Vec<Primitive>) -> Self {
        if primitives.is_empty() {
            return BvhNode::Empty;
        }
        Self::build(primitives)
    }

    /// Recursive BVH construction.
    ///
    /// Simple median-split approach: sort primitives by centroid on the
    /// longest axis, split in half, recurse.
    fn build(mut primitives: Vec<Primitive>) -> Self {
        let n = primitives.len();

        let bounds = primitives.iter().fold(Aabb::EMPTY, |acc, p| {
            Aabb::surrounding(&acc, &p.bounding_box())
        });

        if n <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                primitives,
                bbox: bounds,
            };
        }

        // Choose split axis based on centroid spread
        let centroid_bounds = primitives.iter().fold(Aabb::EMPTY, |acc, p| {
            let c = p.bounding_box().centroid();
            Aabb::surrounding(&acc, &Aabb::from_points(c, c))
        });
        let axis = centroid_bounds.longest_axis();

        primitives.sort_unstable_by(|a, b| {
            let a_val = a.bounding_box().centroid()[axis];
            let b_val = b.bounding_box().centroid()[axis];
            a_val.total_cmp(&b_val)
        });

        let right_primitives = primitives.split_off(n / 2);
        let left = Self::build(primitives);
        let right = Self::build(right_primitives);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    /// Nearest hit within `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { primitives, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let mut closest = None;
                let mut max = ray_t.max;
                for primitive in primitives {
                    if let Some(isec) = primitive.hit(ray, Interval::new(ray_t.min, max)) {
                        max = isec.distance;
                        closest = Some(isec);
                    }
                }
                closest
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t);

                // Only check right up to closest hit
                let right_t = match &hit_left {
                    Some(isec) => ray_t.clip_max(isec.distance),
                    None => ray_t,
                };
                right.hit(ray, right_t).or(hit_left)
            }
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

/// Scene-level BVH over every instance element.
pub struct Bvh {
    root: BvhNode,
    primitive_count: usize,
}

impl Bvh {
    /// Flatten all instances to world-space primitives and build the tree.
    pub fn build(scene: &Scene) -> Self {
        let start = Instant::now();
        let primitives = collect_primitives(scene);
        let primitive_count = primitives.len();
        let root = BvhNode::new(primitives);

        log::info!(
            "Built BVH over {} primitives in {:.2?}",
            primitive_count,
            start.elapsed()
        );
        Self {
            root,
            primitive_count,
        }
    }

    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }

    pub fn bounding_box(&self) -> Aabb {
        self.root.bounding_box()
    }
}

impl Intersector for Bvh {
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        self.root.hit(ray, ray.range())
    }
}

fn collect_primitives(scene: &Scene) -> Vec<Primitive> {
    let mut primitives = Vec::with_capacity(scene.element_count());

    for (index, instance) in scene.instances.iter().enumerate() {
        let Some(shape) = scene.shapes.get(instance.shape) else {
            log::warn!("Instance {} references missing shape {}", index, instance.shape);
            continue;
        };
        let frame = &instance.frame;
        let scale = frame_scale(frame);
        let position = |i: u32| {
            let p = shape.positions.get(i as usize).copied().unwrap_or_default();
            frame.transform_point3(p)
        };
        let radius = |i: u32| shape.radius.get(i as usize).copied().unwrap_or(0.0) * scale;

        match shape.kind() {
            ShapeKind::Triangles => {
                for (element, &[i0, i1, i2]) in shape.triangles.iter().enumerate() {
                    let geometry = Geometry::Triangle {
                        p0: position(i0),
                        p1: position(i1),
                        p2: position(i2),
                    };
                    primitives.push(Primitive::new(index, element, geometry));
                }
            }
            ShapeKind::Lines => {
                for (element, &[i0, i1]) in shape.lines.iter().enumerate() {
                    let geometry = Geometry::Line {
                        p0: position(i0),
                        p1: position(i1),
                        r0: radius(i0),
                        r1: radius(i1),
                    };
                    primitives.push(Primitive::new(index, element, geometry));
                }
            }
            ShapeKind::Points => {
                for (element, &i) in shape.points.iter().enumerate() {
                    let geometry = Geometry::Point {
                        p: position(i),
                        r: radius(i),
                    };
                    primitives.push(Primitive::new(index, element, geometry));
                }
            }
            ShapeKind::Empty => {}
        }
    }
    primitives
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_math::{Mat4, Vec3};
    use glint_scene::{Material, Shape};

    fn sphere_row(count: usize) -> Scene {
        let mut scene = Scene::new();
        let shape = scene.add_shape(Shape::uv_sphere(8, 0.5));
        let material = scene.add_material(Material::default());
        for i in 0..count {
            let frame = Mat4::from_translation(Vec3::new(i as f32, 0.0, -5.0));
            scene.add_instance(frame, shape, material);
        }
        scene
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::build(&Scene::new());
        assert_eq!(bvh.primitive_count(), 0);
        assert!(bvh.intersect(&Ray::new(Vec3::ZERO, -Vec3::Z)).is_none());
    }

    #[test]
    fn test_bvh_single_leaf() {
        let node = BvhNode::new(vec![Primitive::new(
            0,
            0,
            Geometry::Point {
                p: Vec3::new(0.0, 0.0, -1.0),
                r: 0.5,
            },
        )]);
        assert!(matches!(node, BvhNode::Leaf { .. }));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert!(node.hit(&ray, ray.range()).is_some());
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let scene = sphere_row(10);
        let bvh = Bvh::build(&scene);
        assert_eq!(bvh.primitive_count(), scene.element_count());

        // Ray that hits the sphere at x=5, offset from the tessellation vertices
        let ray = Ray::new(Vec3::new(5.05, 0.03, 0.0), -Vec3::Z);
        let isec = bvh.intersect(&ray).unwrap();
        assert_eq!(isec.instance, 5);

        // Hit distance near 4.5 (sphere at z=-5, radius 0.5)
        assert!((isec.distance - 4.5).abs() < 0.02);
        let p = scene.eval_position(isec.instance, isec.element, isec.uv);
        assert!((p - ray.at(isec.distance)).length() < 1e-3);
    }

    #[test]
    fn test_bvh_returns_nearest() {
        let mut scene = Scene::new();
        let shape = scene.add_shape(Shape::quad(2.0));
        let material = scene.add_material(Material::default());
        scene.add_instance(Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0)), shape, material);
        scene.add_instance(Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0)), shape, material);

        let bvh = Bvh::build(&scene);
        let isec = bvh.intersect(&Ray::new(Vec3::new(0.3, -0.2, 0.0), -Vec3::Z)).unwrap();
        assert_eq!(isec.instance, 1);
        assert!((isec.distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_scaled_points() {
        let mut scene = Scene::new();
        let shape = scene.add_shape(Shape::point_cloud(vec![Vec3::ZERO], 0.1));
        let material = scene.add_material(Material::default());
        let frame = Mat4::from_scale_rotation_translation(
            Vec3::splat(3.0),
            Default::default(),
            Vec3::new(0.0, 0.0, -5.0),
        );
        scene.add_instance(frame, shape, material);

        let bvh = Bvh::build(&scene);
        // World radius is 0.3, so an offset of 0.2 still hits
        let ray = Ray::new(Vec3::new(0.2, 0.0, 0.0), -Vec3::Z);
        assert!(bvh.intersect(&ray).is_some());
    }
}
