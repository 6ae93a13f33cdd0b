//! Shape geometry and element evaluation.
//!
//! A shape holds exactly one kind of element: points, lines or triangles.
//! Elements are addressed by index and evaluated at local parametric
//! coordinates `uv` returned by intersection.

use glint_math::{Aabb, Vec2, Vec3};
use serde::Deserialize;
use std::f32::consts::PI;

/// The element kind stored in a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Points,
    Lines,
    Triangles,
    Empty,
}

/// Indexed geometry with optional per-vertex attributes.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Shape {
    /// Point elements (one vertex index each)
    pub points: Vec<u32>,
    /// Line elements (two vertex indices each)
    pub lines: Vec<[u32; 2]>,
    /// Triangle elements (three vertex indices each)
    pub triangles: Vec<[u32; 3]>,

    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Vertex normals (may be empty)
    pub normals: Vec<Vec3>,
    /// Vertex texture coordinates (may be empty)
    pub texcoords: Vec<Vec2>,
    /// Vertex radii for points and lines (may be empty)
    pub radius: Vec<f32>,
}

impl Shape {
    /// Which element array this shape uses.
    pub fn kind(&self) -> ShapeKind {
        if !self.triangles.is_empty() {
            ShapeKind::Triangles
        } else if !self.lines.is_empty() {
            ShapeKind::Lines
        } else if !self.points.is_empty() {
            ShapeKind::Points
        } else {
            ShapeKind::Empty
        }
    }

    /// Number of elements of the shape's kind.
    pub fn element_count(&self) -> usize {
        match self.kind() {
            ShapeKind::Triangles => self.triangles.len(),
            ShapeKind::Lines => self.lines.len(),
            ShapeKind::Points => self.points.len(),
            ShapeKind::Empty => 0,
        }
    }

    /// Local-space bounds of all vertices.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_slice(&self.positions)
    }

    /// Largest index referenced by any element, if any.
    pub fn max_vertex_index(&self) -> Option<u32> {
        let points = self.points.iter().copied();
        let lines = self.lines.iter().flatten().copied();
        let triangles = self.triangles.iter().flatten().copied();
        points.chain(lines).chain(triangles).max()
    }

    /// Position on an element in local space.
    pub fn eval_position(&self, element: usize, uv: Vec2) -> Vec3 {
        self.interpolate(&self.positions, element, uv)
            .unwrap_or(Vec3::ZERO)
    }

    /// Shading normal on an element in local space.
    ///
    /// Falls back to the element normal when the shape has no normals.
    pub fn eval_normal(&self, element: usize, uv: Vec2) -> Vec3 {
        if self.normals.is_empty() {
            return self.eval_element_normal(element);
        }
        self.interpolate(&self.normals, element, uv)
            .map(|n| n.normalize_or_zero())
            .unwrap_or(Vec3::Z)
    }

    /// Geometric normal of an element (tangent for lines).
    pub fn eval_element_normal(&self, element: usize) -> Vec3 {
        let position = |i: u32| self.positions.get(i as usize).copied().unwrap_or(Vec3::ZERO);
        match self.kind() {
            ShapeKind::Triangles => match self.triangles.get(element) {
                Some(&[i0, i1, i2]) => {
                    let (p0, p1, p2) = (position(i0), position(i1), position(i2));
                    (p1 - p0).cross(p2 - p0).normalize_or_zero()
                }
                None => Vec3::Z,
            },
            ShapeKind::Lines => match self.lines.get(element) {
                Some(&[i0, i1]) => (position(i1) - position(i0)).normalize_or_zero(),
                None => Vec3::Z,
            },
            ShapeKind::Points | ShapeKind::Empty => Vec3::Z,
        }
    }

    /// Texture coordinates on an element; `uv` itself when the shape has none.
    pub fn eval_texcoord(&self, element: usize, uv: Vec2) -> Vec2 {
        if self.texcoords.is_empty() {
            return uv;
        }
        self.interpolate(&self.texcoords, element, uv).unwrap_or(uv)
    }

    /// Radius on a point or line element. Zero when the shape has no radii.
    pub fn eval_radius(&self, element: usize, uv: Vec2) -> f32 {
        if self.radius.is_empty() {
            return 0.0;
        }
        self.interpolate(&self.radius, element, uv).unwrap_or(0.0)
    }

    /// Interpolate a vertex attribute over an element.
    ///
    /// Triangles use `a0 * (1 - u - v) + a1 * u + a2 * v`, lines
    /// `a0 * (1 - u) + a1 * u`, and points return the vertex value.
    fn interpolate<T>(&self, values: &[T], element: usize, uv: Vec2) -> Option<T>
    where
        T: Copy + std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
    {
        let get = |i: u32| values.get(i as usize).copied();
        match self.kind() {
            ShapeKind::Triangles => {
                let [i0, i1, i2] = *self.triangles.get(element)?;
                let (a0, a1, a2) = (get(i0)?, get(i1)?, get(i2)?);
                Some(a0 * (1.0 - uv.x - uv.y) + a1 * uv.x + a2 * uv.y)
            }
            ShapeKind::Lines => {
                let [i0, i1] = *self.lines.get(element)?;
                let (a0, a1) = (get(i0)?, get(i1)?);
                Some(a0 * (1.0 - uv.x) + a1 * uv.x)
            }
            ShapeKind::Points => get(*self.points.get(element)?),
            ShapeKind::Empty => None,
        }
    }

    /// Tessellated sphere centered at the origin.
    ///
    /// `steps` is the number of latitude bands; longitude uses twice as many.
    /// Normals point outward and texcoords span [0,1]^2.
    pub fn uv_sphere(steps: u32, radius: f32) -> Self {
        let steps = steps.max(2);
        let (nu, nv) = (steps * 2, steps);
        let mut shape = Shape::default();

        for j in 0..=nv {
            for i in 0..=nu {
                let uv = Vec2::new(i as f32 / nu as f32, j as f32 / nv as f32);
                let (phi, theta) = (2.0 * PI * uv.x, PI * uv.y);
                // Poles are snapped so their triangles collapse exactly
                let n = match j {
                    0 => Vec3::Y,
                    j if j == nv => -Vec3::Y,
                    _ => Vec3::new(phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin()),
                };
                shape.positions.push(n * radius);
                shape.normals.push(n);
                shape.texcoords.push(uv);
            }
        }

        let vid = |i: u32, j: u32| j * (nu + 1) + i;
        for j in 0..nv {
            for i in 0..nu {
                let (a, b, c, d) = (vid(i, j), vid(i + 1, j), vid(i + 1, j + 1), vid(i, j + 1));
                shape.triangles.push([a, b, c]);
                shape.triangles.push([a, c, d]);
            }
        }
        shape
    }

    /// Square in the XY plane facing +z, `size` wide.
    pub fn quad(size: f32) -> Self {
        let h = size / 2.0;
        Shape {
            triangles: vec![[0, 1, 2], [0, 2, 3]],
            positions: vec![
                Vec3::new(-h, -h, 0.0),
                Vec3::new(h, -h, 0.0),
                Vec3::new(h, h, 0.0),
                Vec3::new(-h, h, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
            texcoords: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            ..Default::default()
        }
    }

    /// One point element per position, all with the same radius.
    pub fn point_cloud(positions: Vec<Vec3>, radius: f32) -> Self {
        let count = positions.len();
        Shape {
            points: (0..count as u32).collect(),
            positions,
            radius: vec![radius; count],
            ..Default::default()
        }
    }

    /// Connected line segments through the given positions.
    pub fn polyline(positions: Vec<Vec3>, radius: f32) -> Self {
        let count = positions.len();
        Shape {
            lines: (1..count as u32).map(|i| [i - 1, i]).collect(),
            positions,
            radius: vec![radius; count],
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Shape {
        Shape {
            triangles: vec![[0, 1, 2]],
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            ..Default::default()
        }
    }

    #[test]
    fn test_shape_kind() {
        assert_eq!(triangle().kind(), ShapeKind::Triangles);
        assert_eq!(Shape::point_cloud(vec![Vec3::ZERO], 0.1).kind(), ShapeKind::Points);
        assert_eq!(Shape::polyline(vec![Vec3::ZERO, Vec3::X], 0.1).kind(), ShapeKind::Lines);
        assert_eq!(Shape::default().kind(), ShapeKind::Empty);
    }

    #[test]
    fn test_triangle_interpolation() {
        let shape = triangle();

        assert_eq!(shape.eval_position(0, Vec2::ZERO), Vec3::ZERO);
        assert_eq!(shape.eval_position(0, Vec2::new(1.0, 0.0)), Vec3::X);
        assert_eq!(shape.eval_position(0, Vec2::new(0.0, 1.0)), Vec3::Y);
        assert_eq!(shape.eval_position(0, Vec2::new(0.5, 0.5)), Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_fallback_attributes() {
        let shape = triangle();

        // No normals: counter-clockwise triangle in XY faces +Z
        assert_eq!(shape.eval_normal(0, Vec2::new(0.2, 0.2)), Vec3::Z);
        // No texcoords: the hit uv is returned unchanged
        assert_eq!(shape.eval_texcoord(0, Vec2::new(0.3, 0.6)), Vec2::new(0.3, 0.6));
        assert_eq!(shape.eval_radius(0, Vec2::ZERO), 0.0);
    }

    #[test]
    fn test_line_evaluation() {
        let shape = Shape::polyline(vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)], 0.25);

        assert_eq!(shape.element_count(), 1);
        assert_eq!(shape.eval_position(0, Vec2::new(0.5, 0.0)), Vec3::X);
        assert_eq!(shape.eval_element_normal(0), Vec3::X);
        assert_eq!(shape.eval_radius(0, Vec2::new(0.5, 0.0)), 0.25);
    }

    #[test]
    fn test_uv_sphere() {
        let sphere = Shape::uv_sphere(8, 2.0);

        assert_eq!(sphere.triangles.len(), 8 * 16 * 2);
        assert_eq!(sphere.max_vertex_index(), Some(sphere.positions.len() as u32 - 1));
        for (p, n) in sphere.positions.iter().zip(&sphere.normals) {
            assert!((p.length() - 2.0).abs() < 1e-4);
            assert!((*p / 2.0 - *n).length() < 1e-5);
        }
    }

    #[test]
    fn test_uv_sphere_winding_faces_outward() {
        let sphere = Shape::uv_sphere(8, 1.0);

        // Skip the degenerate pole triangles
        for element in 0..sphere.triangles.len() {
            let face = sphere.eval_element_normal(element);
            if face == Vec3::ZERO {
                continue;
            }
            let center = sphere.eval_position(element, Vec2::splat(1.0 / 3.0));
            assert!(face.dot(center) > 0.0, "element {element} faces inward");
        }
    }

    #[test]
    fn test_quad() {
        let quad = Shape::quad(2.0);

        assert_eq!(quad.element_count(), 2);
        assert_eq!(quad.eval_element_normal(0), Vec3::Z);
        assert_eq!(quad.bounds().max().x, 1.0);
    }

    #[test]
    fn test_shape_deserialize() {
        let json = r#"{
            "triangles": [[0, 1, 2]],
            "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]]
        }"#;
        let shape: Shape = serde_json::from_str(json).unwrap();
        assert_eq!(shape.kind(), ShapeKind::Triangles);
        assert!(shape.normals.is_empty());
    }
}
