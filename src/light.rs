use crate::algebra::Vec3;

/// Point light with a sampling radius for soft shadows.
#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    pub pos: Vec3,
    pub color: Vec3,
    pub radius: f32,
}

/// Unshadowed constant term, multiplied by the surface diffuse color.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ambient {
    pub color: Vec3,
}
