use crate::algebra::Vec3;
use crate::material::Material;

/// Direction is not required to be unit on construction; the shader
/// normalizes before shading.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

/// Outcome of a ray/primitive query. `point = origin + time * dir` and
/// `normal` is the unit outward surface normal.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    pub time: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub material: Material,
}
