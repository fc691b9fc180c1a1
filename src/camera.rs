use crate::algebra::{Vec2, Vec3};
use crate::ray::Ray;
use crate::sampling::{sample_disk, sample_triangle};
use rand::Rng;

/// One triangle of a polygonal lens shape, in lens-plane coordinates.
/// `weight` is the triangle's share of the total aperture area.
#[derive(Clone, Copy, Debug)]
pub struct LensTriangle {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
    pub weight: f32,
}

impl LensTriangle {
    fn area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
        let va = b - a;
        let vb = c - a;
        let h = vb.dot(va.perp().scale(1.0 / va.norm())).abs();
        va.norm() * h / 2.0
    }
}

/// Projection rectangle plus a thin lens at `pos = center + w * r`.
#[derive(Clone, Debug)]
pub struct Camera {
    pub pos: Vec3,
    pub center: Vec3,
    /// Half-width vector of the projection rectangle.
    pub u: Vec3,
    /// Half-height vector of the projection rectangle.
    pub v: Vec3,
    /// Forward axis, `normalize(u x v)`.
    pub w: Vec3,
    pub r: f32,

    pub aperture: f32,
    pub focal_point: f32,
    pub refraction_index: f32,
    pub r1: f32,
    pub r2: f32,

    pub lens_triangles: Vec<LensTriangle>,
}

impl Camera {
    pub fn new(
        center: Vec3,
        u: Vec3,
        v: Vec3,
        r: f32,
        aperture: f32,
        focal_point: f32,
        refraction_index: f32,
        r1: f32,
        r2: f32,
        lens_shape: Vec<(Vec2, Vec2, Vec2)>,
    ) -> Self {
        let w = u.cross(v).normalize();
        let pos = center + w.scale(r);

        let mut lens_triangles: Vec<LensTriangle> = lens_shape
            .into_iter()
            .map(|(a, b, c)| LensTriangle { a, b, c, weight: LensTriangle::area(a, b, c) })
            .collect();
        let total: f32 = lens_triangles.iter().map(|t| t.weight).sum();
        for t in &mut lens_triangles {
            t.weight /= total;
        }

        Self { pos, center, u, v, w, r, aperture, focal_point, refraction_index, r1, r2, lens_triangles }
    }

    /// Random offset in the lens. Walks the shaped-lens triangles by area
    /// weight when a shape is defined, falls back to a circular lens.
    pub fn rand_lens_point(&self, rng: &mut impl Rng) -> Vec2 {
        if !self.lens_triangles.is_empty() {
            let pick = rng.gen::<f32>();
            let mut running = 0.0;
            for t in &self.lens_triangles {
                running += t.weight;
                if running >= pick {
                    return sample_triangle(rng, t.a, t.b, t.c);
                }
            }
        }
        sample_disk(rng, self.aperture)
    }

    /// Ray from a random lens point through the focal-plane target of the
    /// given pixel position.
    pub fn dof_ray(&self, pixel_pos: Vec3, focal_dist: f32, rng: &mut impl Rng) -> Ray {
        let center_dir = (pixel_pos - self.pos).normalize();
        let focus_pos = self.pos + center_dir.scale(focal_dist);

        let offset = self.rand_lens_point(rng);
        let mut lens_point = self.pos + self.u.scale(offset.0) + self.v.scale(offset.1);
        // re-project onto the lens plane
        let along = (lens_point - self.pos).dot(self.w);
        lens_point = lens_point - self.w.scale(along);

        Ray::new(lens_point, focus_pos - lens_point)
    }

    /// Lens-to-focal-plane distance for a point `axis_offset` away from
    /// the optical axis, including the spherical-aberration falloff. A
    /// refraction index of 0 disables the lens model entirely.
    pub fn focal_distance(&self, axis_offset: f32) -> f32 {
        let n = self.refraction_index;
        if n == 0.0 {
            return self.focal_point;
        }

        let focal_length = 1.0 / ((n - 1.0) * (1.0 / self.r1 - 1.0 / self.r2));
        let image_distance = focal_length - self.focal_point;

        let q = (self.r2 + self.r1) / (self.r2 - self.r1);
        let p = (image_distance - self.focal_point) / focal_length;

        let k = 1.0 / (4.0 * focal_length * n * (n - 1.0))
            * ((n + 2.0) / (n - 1.0) * q * q
                + 4.0 * (n + 1.0) * q * p
                + (3.0 * n + 2.0) * (n - 1.0) * p * p
                + n * n * n / (n - 1.0));

        let delta_focal = 0.5 * k * axis_offset * axis_offset;

        focal_length - delta_focal - image_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plain_camera() -> Camera {
        Camera::new(
            Vec3(0.0, 0.0, 4.0),
            Vec3(1.0, 0.0, 0.0),
            Vec3(0.0, 1.0, 0.0),
            1.0,
            0.1,
            5.0,
            1.5,
            1.0,
            -1.0,
            Vec::new(),
        )
    }

    #[test]
    fn position_sits_behind_the_plane() {
        let cam = plain_camera();
        // w = normalize(u x v) = +z, pos = center + w * r
        assert!((cam.w - Vec3(0.0, 0.0, 1.0)).norm() < 1e-6);
        assert!((cam.pos - Vec3(0.0, 0.0, 5.0)).norm() < 1e-6);
    }

    #[test]
    fn on_axis_focus_matches_configuration() {
        let cam = plain_camera();
        assert!((cam.focal_distance(0.0) - cam.focal_point).abs() < 1e-4);
    }

    #[test]
    fn off_axis_focus_is_shorter() {
        let cam = plain_camera();
        assert!(cam.focal_distance(0.5) < cam.focal_distance(0.0));
    }

    #[test]
    fn zero_index_disables_the_lens_model() {
        let mut cam = plain_camera();
        cam.refraction_index = 0.0;
        assert_eq!(cam.focal_distance(0.7), cam.focal_point);
    }

    #[test]
    fn lens_weights_sum_to_one() {
        let shape = vec![
            (Vec2(0.0, 0.0), Vec2(1.0, 0.0), Vec2(0.0, 1.0)),
            (Vec2(0.0, 0.0), Vec2(-2.0, 0.0), Vec2(0.0, -1.0)),
            (Vec2(0.0, 0.0), Vec2(0.5, 0.5), Vec2(-0.5, 0.5)),
        ];
        let cam = Camera::new(
            Vec3(0.0, 0.0, 0.0),
            Vec3(1.0, 0.0, 0.0),
            Vec3(0.0, 1.0, 0.0),
            1.0,
            0.1,
            5.0,
            0.0,
            1.0,
            -1.0,
            shape,
        );
        let total: f32 = cam.lens_triangles.iter().map(|t| t.weight).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn circular_lens_points_stay_in_aperture() {
        let cam = plain_camera();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            assert!(cam.rand_lens_point(&mut rng).norm() <= cam.aperture + 1e-6);
        }
    }

    #[test]
    fn shaped_lens_points_come_from_the_shape() {
        let shape = vec![(Vec2(1.0, 1.0), Vec2(2.0, 1.0), Vec2(1.0, 2.0))];
        let cam = Camera::new(
            Vec3(0.0, 0.0, 0.0),
            Vec3(1.0, 0.0, 0.0),
            Vec3(0.0, 1.0, 0.0),
            1.0,
            0.1,
            5.0,
            0.0,
            1.0,
            -1.0,
            shape,
        );
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let p = cam.rand_lens_point(&mut rng);
            // every sample falls in the triangle's bounding square
            assert!(p.0 >= 1.0 - 1e-5 && p.0 <= 2.0 + 1e-5);
            assert!(p.1 >= 1.0 - 1e-5 && p.1 <= 2.0 + 1e-5);
        }
    }

    #[test]
    fn dof_ray_starts_on_the_lens_plane() {
        let cam = plain_camera();
        let mut rng = StdRng::seed_from_u64(9);
        let ray = cam.dof_ray(Vec3(0.3, -0.2, 4.0), 5.0, &mut rng);
        // the origin has no component along the forward axis
        assert!((ray.origin - cam.pos).dot(cam.w).abs() < 1e-5);
    }
}
