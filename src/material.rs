use crate::algebra::Vec3;

#[derive(Clone, Copy, Debug)]
pub struct Material {
    pub diffuse_color: Vec3,
    /// Fraction of energy that goes into the specular (reflect + refract) split.
    pub specular_reflection: f32,
    pub specular_exponent: f32,
    /// Per-material attenuation, kept from the scene format but not consumed
    /// by the shader (the air medium attenuates between contacts).
    pub attenuation: Vec3,
    pub electric_permittivity: f32,
    pub magnetic_permeability: f32,
    /// Radius of the jitter ball around the mirror direction. 0 is mirror-sharp.
    pub roughness: f32,
}

/// The homogeneous medium enclosing the camera.
#[derive(Clone, Copy, Debug)]
pub struct Medium {
    pub electric_permittivity: f32,
    pub magnetic_permeability: f32,
    /// Per-channel multiplicative loss per unit distance.
    pub attenuation: Vec3,
}

impl Default for Medium {
    fn default() -> Self {
        Self {
            electric_permittivity: 1.0,
            magnetic_permeability: 1.0,
            attenuation: Vec3(1.0, 1.0, 1.0),
        }
    }
}
