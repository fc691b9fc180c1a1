use crate::algebra::Vec3;
use crate::material::Material;
use crate::ray::{Contact, Ray};

#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub pos: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    /// Closest hit in front of the ray origin; the far root when the
    /// origin is inside. The normal always points outward.
    pub fn intersect(&self, ray: &Ray) -> Option<Contact> {
        let oc = ray.origin - self.pos;
        let a = ray.dir.dot(ray.dir);
        let b = 2.0 * ray.dir.dot(oc);
        let c = oc.dot(oc) - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }

        let t1 = (-b + disc.sqrt()) / (2.0 * a);
        let t2 = (-b - disc.sqrt()) / (2.0 * a);

        let t = if t1 < 0.0 {
            return None; // sphere behind the ray
        } else if t2 < 0.0 {
            t1 // origin inside
        } else {
            t2
        };

        let point = ray.at(t);
        let normal = (point - self.pos).scale(1.0 / self.radius);
        Some(Contact { time: t, point, normal, material: self.material })
    }
}
