use crate::algebra::{Mat3, Vec3};
use crate::material::Material;
use crate::ray::{Contact, Ray};

/// Ellipsoid spanned by three axis vectors; intersection runs in the
/// unit-sphere space reached through the inverse of `[u | v | w]`.
#[derive(Clone, Copy, Debug)]
pub struct Ellipsoid {
    pub pos: Vec3,
    inv_model: Mat3,
    pub material: Material,
}

impl Ellipsoid {
    /// `None` when the axis matrix is singular.
    pub fn new(pos: Vec3, u: Vec3, v: Vec3, w: Vec3, material: Material) -> Option<Self> {
        let inv_model = Mat3::from_cols(u, v, w).inverse()?;
        Some(Self { pos, inv_model, material })
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Contact> {
        // the transform is linear in t, so the unit-space time is valid in world space
        let p0 = self.inv_model.mul_vec(ray.origin - self.pos);
        let dir = self.inv_model.mul_vec(ray.dir);

        let a = dir.dot(dir);
        let b = 2.0 * p0.dot(dir);
        let c = p0.dot(p0) - 1.0;

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }

        let t1 = (-b + disc.sqrt()) / (2.0 * a);
        let t2 = (-b - disc.sqrt()) / (2.0 * a);

        let t = if t1 < 0.0 {
            return None;
        } else if t2 < 0.0 {
            t1
        } else {
            t2
        };

        let point_unit = p0 + dir.scale(t);
        let normal = self.inv_model.transpose().mul_vec(point_unit).normalize();
        let point = ray.at(t);
        Some(Contact { time: t, point, normal, material: self.material })
    }
}
