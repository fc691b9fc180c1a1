use crate::algebra::{Vec2, Vec3};
use rand::Rng;
use std::f32::consts::PI;

/// Uniform sample on a disk of the given radius.
pub fn sample_disk(rng: &mut impl Rng, radius: f32) -> Vec2 {
    let angle = rng.gen::<f32>() * 2.0 * PI;
    let r = radius * rng.gen::<f32>().sqrt();
    Vec2(r * angle.cos(), r * angle.sin())
}

/// Uniform sample inside the unit ball, by rejection.
pub fn sample_ball(rng: &mut impl Rng) -> Vec3 {
    loop {
        let p = Vec3(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.dot(p) <= 1.0 {
            return p;
        }
    }
}

/// Uniform sample inside the ball of the given center and radius.
pub fn sample_in_sphere(rng: &mut impl Rng, center: Vec3, radius: f32) -> Vec3 {
    center + sample_ball(rng).scale(radius)
}

/// Uniform sample inside a 2D triangle.
pub fn sample_triangle(rng: &mut impl Rng, a: Vec2, b: Vec2, c: Vec2) -> Vec2 {
    let r1 = rng.gen::<f32>().sqrt();
    let r2 = rng.gen::<f32>();
    a.scale(1.0 - r1) + b.scale(r1 * (1.0 - r2)) + c.scale(r1 * r2)
}
