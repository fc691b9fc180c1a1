use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3(pub f32, pub f32, pub f32);

impl Vec3 {
    #[inline] pub fn scale(self, f: f32) -> Self { Self(self.0 * f, self.1 * f, self.2 * f) }
    #[inline] pub fn dot(self, v: Self) -> f32 { self.0 * v.0 + self.1 * v.1 + self.2 * v.2 }
    #[inline] pub fn cross(self, v: Self) -> Self {
        Self(self.1 * v.2 - self.2 * v.1, self.2 * v.0 - self.0 * v.2, self.0 * v.1 - self.1 * v.0)
    }
    #[inline] pub fn norm(self) -> f32 { self.dot(self).sqrt() }
    #[inline] pub fn normalize(self) -> Self { self.scale(1.0 / self.norm()) }

    /// Applies a function to each component of the vector.
    #[inline]
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        Self(f(self.0), f(self.1), f(self.2))
    }

    #[inline] pub fn clamp01(self) -> Self { self.map(|c| c.clamp(0.0, 1.0)) }
    #[inline] pub fn is_finite(self) -> bool { self.0.is_finite() && self.1.is_finite() && self.2.is_finite() }
}

impl Add for Vec3 { type Output = Self; #[inline] fn add(self, v: Self) -> Self { Self(self.0 + v.0, self.1 + v.1, self.2 + v.2) } }
impl Sub for Vec3 { type Output = Self; #[inline] fn sub(self, v: Self) -> Self { Self(self.0 - v.0, self.1 - v.1, self.2 - v.2) } }
impl Mul for Vec3 { type Output = Self; #[inline] fn mul(self, v: Self) -> Self { Self(self.0 * v.0, self.1 * v.1, self.2 * v.2) } } // Element-wise
impl Mul<f32> for Vec3 { type Output = Self; #[inline] fn mul(self, f: f32) -> Self { self.scale(f) } }
impl Neg for Vec3 { type Output = Self; #[inline] fn neg(self) -> Self { Self(-self.0, -self.1, -self.2) } }
impl AddAssign for Vec3 { #[inline] fn add_assign(&mut self, v: Self) { *self = *self + v; } }

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2(pub f32, pub f32);

impl Vec2 {
    #[inline] pub fn scale(self, f: f32) -> Self { Self(self.0 * f, self.1 * f) }
    #[inline] pub fn dot(self, v: Self) -> f32 { self.0 * v.0 + self.1 * v.1 }
    #[inline] pub fn norm(self) -> f32 { self.dot(self).sqrt() }
    /// Counter-clockwise perpendicular.
    #[inline] pub fn perp(self) -> Self { Self(-self.1, self.0) }
}

impl Add for Vec2 { type Output = Self; #[inline] fn add(self, v: Self) -> Self { Self(self.0 + v.0, self.1 + v.1) } }
impl Sub for Vec2 { type Output = Self; #[inline] fn sub(self, v: Self) -> Self { Self(self.0 - v.0, self.1 - v.1) } }

/// Mirror `i` about the unit normal `n`.
#[inline]
pub fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    i - n.scale(2.0 * i.dot(n))
}

/// Bend unit `i` through the interface with unit normal `n` and ratio
/// `eta = n_i / n_t`. Returns the zero vector under total internal
/// reflection.
#[inline]
pub fn refract(i: Vec3, n: Vec3, eta: f32) -> Vec3 {
    let cos_i = -i.dot(n);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        Vec3::default()
    } else {
        i.scale(eta) + n.scale(eta * cos_i - k.sqrt())
    }
}

/// Column-major 3x3 matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat3 {
    pub cols: [Vec3; 3],
}

impl Mat3 {
    pub fn from_cols(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self { cols: [x, y, z] }
    }

    #[inline]
    pub fn mul_vec(self, v: Vec3) -> Vec3 {
        self.cols[0].scale(v.0) + self.cols[1].scale(v.1) + self.cols[2].scale(v.2)
    }

    pub fn transpose(self) -> Self {
        let [x, y, z] = self.cols;
        Self::from_cols(Vec3(x.0, y.0, z.0), Vec3(x.1, y.1, z.1), Vec3(x.2, y.2, z.2))
    }

    pub fn det(self) -> f32 {
        let [x, y, z] = self.cols;
        x.dot(y.cross(z))
    }

    /// `None` when the matrix is singular.
    pub fn inverse(self) -> Option<Self> {
        let [x, y, z] = self.cols;
        let det = self.det();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        // rows of the inverse are the column cross products over the determinant
        let adj = Self::from_cols(y.cross(z), z.cross(x), x.cross(y)).transpose();
        Some(Self::from_cols(
            adj.cols[0].scale(1.0 / det),
            adj.cols[1].scale(1.0 / det),
            adj.cols[2].scale(1.0 / det),
        ))
    }

    pub fn rotation_x(rad: f32) -> Self {
        let (s, c) = rad.sin_cos();
        Self::from_cols(Vec3(1.0, 0.0, 0.0), Vec3(0.0, c, s), Vec3(0.0, -s, c))
    }

    pub fn rotation_y(rad: f32) -> Self {
        let (s, c) = rad.sin_cos();
        Self::from_cols(Vec3(c, 0.0, -s), Vec3(0.0, 1.0, 0.0), Vec3(s, 0.0, c))
    }

    pub fn rotation_z(rad: f32) -> Self {
        let (s, c) = rad.sin_cos();
        Self::from_cols(Vec3(c, s, 0.0), Vec3(-s, c, 0.0), Vec3(0.0, 0.0, 1.0))
    }
}

impl Mul for Mat3 {
    type Output = Self;
    fn mul(self, m: Self) -> Self {
        Self::from_cols(self.mul_vec(m.cols[0]), self.mul_vec(m.cols[1]), self.mul_vec(m.cols[2]))
    }
}
