use crate::algebra::Vec3;
use crate::material::Material;
use crate::ray::{Contact, Ray};

/// Grazing-incidence cutoff for the triangle plane test.
const GRAZING_EPS: f32 = 0.01;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub normal: Vec3,
}

impl Triangle {
    /// `None` for a degenerate (zero-area) triangle.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Option<Self> {
        let n = (b - a).cross(c - a);
        if n.norm() == 0.0 || !n.is_finite() {
            return None;
        }
        Some(Self { a, b, c, normal: n.normalize() })
    }

    /// Intersection time and point, in front of the origin only.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        let div = self.normal.dot(ray.dir);
        if div.abs() < GRAZING_EPS {
            return None;
        }

        let time = (self.normal.dot(self.a) - self.normal.dot(ray.origin)) / div;
        if time < 0.0 {
            return None;
        }

        let point = ray.at(time);
        if !self.contains(point) {
            return None;
        }
        Some((time, point))
    }

    /// Barycentric inside test against the supporting plane.
    fn contains(&self, point: Vec3) -> bool {
        let v0 = self.b - self.a;
        let v1 = self.c - self.a;
        let v2 = point - self.a;

        let v0v0 = v0.dot(v0);
        let v0v1 = v0.dot(v1);
        let v1v1 = v1.dot(v1);
        let uv0 = v2.dot(v0);
        let uv1 = v2.dot(v1);

        let div = v0v0 * v1v1 - v0v1 * v0v1;
        if div == 0.0 {
            return false;
        }

        let beta = (v1v1 * uv0 - v0v1 * uv1) / div;
        let gamma = (v0v0 * uv1 - v0v1 * uv0) / div;
        let alpha = 1.0 - beta - gamma;

        alpha >= 0.0 && beta >= 0.0 && gamma >= 0.0
    }
}

/// Convex polygon, fan-triangulated from the first vertex.
#[derive(Clone, Debug)]
pub struct Polygon {
    pub vertices: Vec<Vec3>,
    pub normal: Vec3,
    pub material: Material,
}

impl Polygon {
    /// `None` when fewer than three vertices are given or the first three
    /// are colinear.
    pub fn new(vertices: Vec<Vec3>, material: Material) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let normal = Triangle::new(vertices[0], vertices[1], vertices[2])?.normal;
        Some(Self { vertices, normal, material })
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Contact> {
        let a = self.vertices[0];
        for i in 1..self.vertices.len() - 1 {
            let Some(tri) = Triangle::new(a, self.vertices[i], self.vertices[i + 1]) else {
                continue;
            };
            // convex: at most one fan triangle can hit
            if let Some((time, point)) = tri.intersect(ray) {
                return Some(Contact { time, point, normal: self.normal, material: self.material });
            }
        }
        None
    }
}
