use crate::algebra::Vec3;
use crate::material::Material;
use crate::ray::{Contact, Ray};

/// Supporting plane of a cuboid face.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// Parametric intersection time, unbounded in sign. `None` when the
    /// ray runs parallel to the plane.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let div = ray.dir.dot(self.normal);
        if div == 0.0 {
            return None;
        }
        Some(-(ray.origin - self.point).dot(self.normal) / div)
    }
}

/// Parallelepiped spanned by three edge vectors out of a corner.
#[derive(Clone, Debug)]
pub struct Cuboid {
    pub corner: Vec3,
    pub length: Vec3,
    pub width: Vec3,
    pub height: Vec3,
    planes: [Plane; 6],
    pub material: Material,
}

impl Cuboid {
    pub fn new(corner: Vec3, length: Vec3, width: Vec3, height: Vec3, material: Material) -> Self {
        let planes = [
            Plane { point: corner, normal: length.cross(height).normalize() },
            Plane { point: corner + width, normal: height.cross(length).normalize() },
            Plane { point: corner, normal: height.cross(width).normalize() },
            Plane { point: corner + length, normal: width.cross(height).normalize() },
            Plane { point: corner, normal: width.cross(length).normalize() },
            Plane { point: corner + height, normal: length.cross(width).normalize() },
        ];
        Self { corner, length, width, height, planes, material }
    }

    /// Slab-style sweep over the six face planes. Returns the entry hit,
    /// or the exit hit when the ray starts inside.
    pub fn intersect(&self, ray: &Ray) -> Option<Contact> {
        let mut t_min = 0.0f32;
        let mut t_max = f32::MAX;
        let mut entry = (Vec3::default(), Vec3::default());
        let mut exit = (Vec3::default(), Vec3::default());

        for plane in &self.planes {
            let facing = ray.dir.dot(plane.normal);
            if facing < 0.0 {
                // front face: latest entry wins
                if let Some(t) = plane.intersect(ray) {
                    if t > t_min {
                        t_min = t;
                        entry = (ray.at(t), plane.normal);
                    }
                }
            } else if facing > 0.0 {
                // back face: earliest exit wins
                if let Some(t) = plane.intersect(ray) {
                    if t < t_max {
                        t_max = t;
                        exit = (ray.at(t), plane.normal);
                    }
                }
            } else if (ray.origin - plane.point).dot(plane.normal) > 0.0 {
                // parallel on the outside of this face
                return None;
            }
        }

        if t_max < t_min {
            return None;
        }
        // t_min never advanced: the origin is inside, report the exit
        if t_min == 0.0 {
            let (point, normal) = exit;
            Some(Contact { time: t_max, point, normal, material: self.material })
        } else {
            let (point, normal) = entry;
            Some(Contact { time: t_min, point, normal, material: self.material })
        }
    }
}
