//! World-space primitives for ray intersection.
//!
//! Triangles use the Möller-Trumbore algorithm. Points are spheres and lines
//! are capsules with a radius interpolated along the segment.

use glint_math::{Aabb, Interval, Mat4, Ray, Vec2, Vec3};

/// Result of a successful ray intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Index into `Scene::instances`
    pub instance: usize,
    /// Element index within the instance's shape
    pub element: usize,
    /// Local parametric coordinates on the element
    pub uv: Vec2,
    /// Ray parameter at the hit
    pub distance: f32,
}

/// Primitive geometry, already transformed to world space.
#[derive(Debug, Clone, Copy)]
pub enum Geometry {
    Point { p: Vec3, r: f32 },
    Line { p0: Vec3, p1: Vec3, r0: f32, r1: f32 },
    Triangle { p0: Vec3, p1: Vec3, p2: Vec3 },
}

/// A single element of a scene instance.
#[derive(Debug, Clone, Copy)]
pub struct Primitive {
    pub instance: usize,
    pub element: usize,
    pub geometry: Geometry,
    bbox: Aabb,
}

impl Primitive {
    pub fn new(instance: usize, element: usize, geometry: Geometry) -> Self {
        let bbox = match geometry {
            Geometry::Point { p, r } => Aabb::from_points(p, p).inflate(r),
            Geometry::Line { p0, p1, r0, r1 } => Aabb::from_points(p0, p1).inflate(r0.max(r1)),
            Geometry::Triangle { p0, p1, p2 } => Aabb::from_slice(&[p0, p1, p2]),
        };
        Self {
            instance,
            element,
            geometry,
            bbox,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Test the ray against this primitive within `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection> {
        let (uv, distance) = match self.geometry {
            Geometry::Point { p, r } => intersect_point(ray, ray_t, p, r)?,
            Geometry::Line { p0, p1, r0, r1 } => intersect_line(ray, ray_t, p0, p1, r0, r1)?,
            Geometry::Triangle { p0, p1, p2 } => intersect_triangle(ray, ray_t, p0, p1, p2)?,
        };
        Some(Intersection {
            instance: self.instance,
            element: self.element,
            uv,
            distance,
        })
    }
}

/// Uniform scale factor applied by a frame, used to carry radii to world space.
pub fn frame_scale(frame: &Mat4) -> f32 {
    let lengths = [Vec3::X, Vec3::Y, Vec3::Z].map(|axis| frame.transform_vector3(axis).length());
    (lengths[0] + lengths[1] + lengths[2]) / 3.0
}

fn intersect_point(ray: &Ray, ray_t: Interval, p: Vec3, r: f32) -> Option<(Vec2, f32)> {
    let w = p - ray.origin;
    let t = w.dot(ray.direction) / ray.direction.length_squared();
    if !ray_t.contains(t) {
        return None;
    }

    let closest = ray.at(t);
    if (p - closest).length_squared() > r * r {
        return None;
    }
    Some((Vec2::ZERO, t))
}

fn intersect_line(
    ray: &Ray,
    ray_t: Interval,
    p0: Vec3,
    p1: Vec3,
    r0: f32,
    r1: f32,
) -> Option<(Vec2, f32)> {
    // Closest approach between the ray and the segment
    let u = ray.direction;
    let v = p1 - p0;
    let w = ray.origin - p0;

    let a = u.dot(u);
    let b = u.dot(v);
    let c = v.dot(v);
    let d = u.dot(w);
    let e = v.dot(w);
    let det = a * c - b * b;
    if det == 0.0 {
        return None;
    }

    let t = (b * e - c * d) / det;
    let s = (a * e - b * d) / det;
    if !ray_t.contains(t) {
        return None;
    }

    let s = s.clamp(0.0, 1.0);
    let on_ray = ray.at(t);
    let on_line = p0 + v * s;
    let dist2 = (on_ray - on_line).length_squared();
    let r = r0 * (1.0 - s) + r1 * s;
    if dist2 > r * r {
        return None;
    }
    Some((Vec2::new(s, dist2.sqrt() / r), t))
}

fn intersect_triangle(
    ray: &Ray,
    ray_t: Interval,
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
) -> Option<(Vec2, f32)> {
    let edge1 = p1 - p0;
    let edge2 = p2 - p0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a == 0.0 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - p0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if !ray_t.contains(t) {
        return None;
    }
    Some((Vec2::new(u, v), t))
}
