use crate::cuboid::Cuboid;
use crate::ellipsoid::Ellipsoid;
use crate::mesh::Mesh;
use crate::polygon::Polygon;
use crate::ray::{Contact, Ray};
use crate::sphere::Sphere;

#[derive(Clone, Debug)]
pub enum Primitive {
    Sphere(Sphere),
    Cuboid(Cuboid),
    Polygon(Polygon),
    Ellipsoid(Ellipsoid),
    Mesh(Mesh),
}

impl Primitive {
    pub fn intersect(&self, ray: &Ray) -> Option<Contact> {
        match self {
            Self::Sphere(s) => s.intersect(ray),
            Self::Cuboid(c) => c.intersect(ray),
            Self::Polygon(p) => p.intersect(ray),
            Self::Ellipsoid(e) => e.intersect(ray),
            Self::Mesh(m) => m.intersect(ray),
        }
    }
}
