use crate::algebra::Vec3;
use crate::config::Config;
use crate::preview::Preview;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::shader;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;
use thiserror::Error;

/// Sentinel fill so unrendered regions are visible in partial frames.
const FILL: [u8; 3] = [240, 145, 0];
/// Corner-disagreement threshold of the adaptive sampler.
const ADAPTIVE_TOLERANCE: f32 = 0.05;

const BLACK: Vec3 = Vec3(0.0, 0.0, 0.0);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Fixed worker count: one thread per core, minus one for the driving
/// thread, never less than one.
fn worker_count() -> usize {
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    cores.saturating_sub(1).max(1)
}

/// Render with a progress bar and, when configured, a live preview that
/// stays up until the user closes it. Closing the window mid-render
/// cancels the remaining work; the partial buffer is returned either way.
pub fn trace_scene(scene: &Scene, config: &Config, base_seed: u64) -> Result<Vec<u8>, RenderError> {
    let mut preview = if config.window {
        Preview::create(config.width, config.height)
    } else {
        None
    };
    let cancel = AtomicBool::new(false);

    let bar = ProgressBar::new(config.height as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} rows | {elapsed_precise} | ETA: {eta}")
            .unwrap(),
    );

    let buffer = render(scene, config, base_seed, &cancel, |row_done, partial| {
        if row_done {
            bar.inc(1);
        }
        if let Some(p) = preview.as_mut() {
            p.update(partial);
            if !p.is_open() {
                cancel.store(true, Ordering::Relaxed);
            }
        }
    })?;
    bar.finish_and_clear();

    // keep the finished frame on screen until the window goes away
    while let Some(p) = preview.as_mut() {
        if !p.is_open() {
            break;
        }
        p.update(&buffer);
    }

    Ok(buffer)
}

/// Core parallel driver. Worker `k` of `T` renders rows `k, k+T, ...`
/// into per-row buffers that the calling thread assembles, so every byte
/// has exactly one writer. `tick` runs on the calling thread after each
/// received row (`true`) and on idle timeouts (`false`), always with the
/// current partial buffer.
pub fn render(
    scene: &Scene,
    config: &Config,
    base_seed: u64,
    cancel: &AtomicBool,
    mut tick: impl FnMut(bool, &[u8]),
) -> Result<Vec<u8>, RenderError> {
    let row_bytes = config.width as usize * 3;
    let mut buffer = FILL
        .iter()
        .copied()
        .cycle()
        .take(config.height as usize * row_bytes)
        .collect::<Vec<u8>>();

    let workers = worker_count();
    let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;
    let (tx, rx) = mpsc::channel::<(u32, Vec<u8>)>();

    pool.in_place_scope(|scope| {
        for id in 0..workers {
            let tx = tx.clone();
            // distinct deterministic stream per worker
            let seed = base_seed ^ (id as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
            scope.spawn(move |_| trace_rows(scene, config, workers, id, seed, cancel, tx));
        }
        drop(tx);

        loop {
            match rx.recv_timeout(Duration::from_millis(16)) {
                Ok((row, data)) => {
                    let start = row as usize * row_bytes;
                    buffer[start..start + row_bytes].copy_from_slice(&data);
                    tick(true, &buffer);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => tick(false, &buffer),
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    });

    Ok(buffer)
}

/// One worker: every `stride`-th row starting at `first_row`. The cancel
/// flag is polled after each pixel; a cancelled worker drops its
/// unfinished row.
fn trace_rows(
    scene: &Scene,
    config: &Config,
    stride: usize,
    first_row: usize,
    seed: u64,
    cancel: &AtomicBool,
    rows: mpsc::Sender<(u32, Vec<u8>)>,
) {
    let camera = &scene.camera;
    let mut rng = StdRng::seed_from_u64(seed);

    let half_width = config.width as f32 / 2.0;
    let half_height = config.height as f32 / 2.0;
    let half_pixel_u = camera.u.scale(1.0 / config.width as f32 / 2.0);
    let half_pixel_v = camera.v.scale(1.0 / config.height as f32 / 2.0);

    for i in (first_row..config.height as usize).step_by(stride) {
        let y = camera.v.scale((i as f32 - half_height + 0.5) / half_height);
        let mut row = Vec::with_capacity(config.width as usize * 3);

        for j in 0..config.width {
            let x = camera.u.scale((j as f32 - half_width + 0.5) / half_width);

            // offset from the optical axis drives the aberration falloff
            let off_x = (j as f32 - half_width + 0.5) / half_width;
            let off_y = (i as f32 - half_height + 0.5) / half_height;
            let axis_dist = (off_x * off_x + off_y * off_y).sqrt() * camera.aperture;
            let focal_dist = camera.focal_distance(axis_dist);

            let pixel_center = x - y + camera.center;
            let color = if config.adaptive_antialiasing {
                adaptive_sample(
                    scene,
                    config,
                    pixel_center,
                    half_pixel_u.scale(0.5),
                    half_pixel_v.scale(0.5),
                    0,
                    &mut rng,
                )
            } else {
                stratified_sample(scene, config, pixel_center, half_pixel_u, half_pixel_v, focal_dist, &mut rng)
            };

            let color = color.clamp01();
            row.push((color.0 * 255.99) as u8);
            row.push((color.1 * 255.99) as u8);
            row.push((color.2 * 255.99) as u8);

            if cancel.load(Ordering::Relaxed) {
                return;
            }
        }

        if rows.send((i as u32, row)).is_err() {
            return;
        }
    }
}

/// Subdivide the pixel into a `⌊√AA⌋ x ⌊√AA⌋` grid; shoot one pinhole ray
/// per sub-cell plus `dof_samples − 1` lens-jittered rays, and average by
/// the configured sample counts.
fn stratified_sample(
    scene: &Scene,
    config: &Config,
    pixel_center: Vec3,
    half_pixel_u: Vec3,
    half_pixel_v: Vec3,
    focal_dist: f32,
    rng: &mut StdRng,
) -> Vec3 {
    let camera = &scene.camera;
    let grid = ((config.antialiasing_samples as f32).sqrt() as u32).max(1);
    let half_grid = grid as f32 / 2.0;

    let mut color = BLACK;
    for k in 0..grid {
        let sub_y = half_pixel_v.scale((k as f32 - half_grid + 0.5) / half_grid);
        for l in 0..grid {
            let sub_x = half_pixel_u.scale((l as f32 - half_grid + 0.5) / half_grid);
            let pixel_pos = pixel_center + sub_x - sub_y;

            for m in 0..config.dof_samples {
                let ray = if m == 0 {
                    Ray::new(camera.pos, (pixel_pos - camera.pos).normalize())
                } else {
                    camera.dof_ray(pixel_pos, focal_dist, rng)
                };
                color += shader::shade(
                    scene,
                    config,
                    &ray,
                    0,
                    scene.air.electric_permittivity,
                    scene.air.magnetic_permeability,
                    rng,
                );
            }
        }
    }

    color.scale(1.0 / (config.antialiasing_samples * config.dof_samples).max(1) as f32)
}

/// Evaluate the four cell corners; recurse on any corner that strays from
/// their mean by more than the tolerance, halving the offsets, until the
/// recursion cap. Pinhole rays only.
fn adaptive_sample(
    scene: &Scene,
    config: &Config,
    center: Vec3,
    offset_x: Vec3,
    offset_y: Vec3,
    depth: u32,
    rng: &mut StdRng,
) -> Vec3 {
    let camera = &scene.camera;
    let corners = [
        center - offset_x + offset_y,
        center + offset_x + offset_y,
        center - offset_x - offset_y,
        center + offset_x - offset_y,
    ];

    let mut colors = [BLACK; 4];
    let mut mean = BLACK;
    for (corner, color) in corners.iter().zip(colors.iter_mut()) {
        let ray = Ray::new(camera.pos, (*corner - camera.pos).normalize());
        *color = shader::shade(
            scene,
            config,
            &ray,
            0,
            scene.air.electric_permittivity,
            scene.air.magnetic_permeability,
            rng,
        );
        mean += *color;
    }
    let mut mean = mean.scale(0.25);

    if depth < config.antialiasing_samples {
        for idx in 0..4 {
            if (colors[idx] - mean).norm() > ADAPTIVE_TOLERANCE {
                colors[idx] = adaptive_sample(
                    scene,
                    config,
                    corners[idx],
                    offset_x.scale(0.5),
                    offset_y.scale(0.5),
                    depth + 1,
                    rng,
                );
            }
        }
        mean = (colors[0] + colors[1] + colors[2] + colors[3]).scale(0.25);
    }

    mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Vec3;
    use crate::camera::Camera;
    use crate::light::Ambient;
    use crate::material::{Material, Medium};
    use crate::primitive::Primitive;
    use crate::sphere::Sphere;

    fn matte_white() -> Material {
        Material {
            diffuse_color: Vec3(1.0, 1.0, 1.0),
            specular_reflection: 0.0,
            specular_exponent: 1.0,
            attenuation: Vec3(1.0, 1.0, 1.0),
            electric_permittivity: 1.0,
            magnetic_permeability: 1.0,
            roughness: 0.0,
        }
    }

    /// White unit sphere at the origin, white ambient, no point lights,
    /// camera at (0,0,5) looking down -z through a 2x2 plane at z = 4.
    fn sphere_scene() -> Scene {
        Scene {
            primitives: vec![Primitive::Sphere(Sphere {
                pos: Vec3(0.0, 0.0, 0.0),
                radius: 1.0,
                material: matte_white(),
            })],
            lights: Vec::new(),
            ambient: Ambient { color: Vec3(1.0, 1.0, 1.0) },
            air: Medium::default(),
            camera: Camera::new(
                Vec3(0.0, 0.0, 4.0),
                Vec3(1.0, 0.0, 0.0),
                Vec3(0.0, 1.0, 0.0),
                1.0,
                0.0,
                5.0,
                0.0,
                1.0,
                -1.0,
                Vec::new(),
            ),
        }
    }

    fn small_config() -> Config {
        Config {
            width: 9,
            height: 9,
            antialiasing_samples: 1,
            dof_samples: 1,
            shadow_samples: 1,
            reflection_samples: 1,
            adaptive_antialiasing: false,
            window: false,
            ..Config::default()
        }
    }

    fn pixel(buffer: &[u8], width: u32, j: u32, i: u32) -> [u8; 3] {
        let at = ((i * width + j) * 3) as usize;
        [buffer[at], buffer[at + 1], buffer[at + 2]]
    }

    #[test]
    fn center_pixel_is_ambient_and_corner_is_black() {
        let scene = sphere_scene();
        let config = small_config();
        let cancel = AtomicBool::new(false);
        let buffer = render(&scene, &config, 1, &cancel, |_, _| {}).unwrap();

        // ambient * diffuse = white, clamped and scaled by 255.99
        assert_eq!(pixel(&buffer, config.width, 4, 4), [255, 255, 255]);
        // outside the silhouette
        assert_eq!(pixel(&buffer, config.width, 0, 0), [0, 0, 0]);
        assert_eq!(pixel(&buffer, config.width, 8, 8), [0, 0, 0]);
    }

    #[test]
    fn same_seed_renders_identical_buffers() {
        let mut scene = sphere_scene();
        // glossy material so the reflection jitter exercises the rng
        if let Primitive::Sphere(s) = &mut scene.primitives[0] {
            s.material.specular_reflection = 0.5;
            s.material.electric_permittivity = 2.25;
            s.material.roughness = 0.3;
        }
        let mut config = small_config();
        config.reflection_samples = 3;
        config.shadow_samples = 2;
        config.depth = 4;

        let cancel = AtomicBool::new(false);
        let first = render(&scene, &config, 99, &cancel, |_, _| {}).unwrap();
        let second = render(&scene, &config, 99, &cancel, |_, _| {}).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn preset_cancel_leaves_the_sentinel_fill() {
        let scene = sphere_scene();
        let config = small_config();
        let cancel = AtomicBool::new(true);
        let buffer = render(&scene, &config, 1, &cancel, |_, _| {}).unwrap();
        // workers bail after their first pixel, before delivering a row
        for px in buffer.chunks_exact(3) {
            assert_eq!(px, FILL.as_slice());
        }
    }

    #[test]
    fn trace_scene_without_window_matches_render() {
        let scene = sphere_scene();
        let config = small_config();
        let traced = trace_scene(&scene, &config, 1).unwrap();
        let cancel = AtomicBool::new(false);
        let direct = render(&scene, &config, 1, &cancel, |_, _| {}).unwrap();
        assert_eq!(traced, direct);
    }

    #[test]
    fn adaptive_flat_region_matches_single_sample() {
        let scene = sphere_scene();
        let mut config = small_config();
        config.adaptive_antialiasing = true;
        config.antialiasing_samples = 3; // recursion cap

        // quarter-pixel offsets deep inside the silhouette
        let offset = scene.camera.u.scale(1.0 / config.width as f32 / 4.0);
        let offset_y = scene.camera.v.scale(1.0 / config.height as f32 / 4.0);
        let mut rng = StdRng::seed_from_u64(0);
        let color = adaptive_sample(&scene, &config, scene.camera.center, offset, offset_y, 0, &mut rng);
        assert!((color - Vec3(1.0, 1.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn adaptive_silhouette_blends_between_regions() {
        let scene = sphere_scene();
        let mut config = small_config();
        config.adaptive_antialiasing = true;
        config.antialiasing_samples = 3;

        // straddle the silhouette: the tangent cone from the camera at
        // distance 5 projects the unit sphere to radius 1/sqrt(24) ~ 0.204
        // on the plane one unit away
        let edge = Vec3(0.2041, 0.0, 4.0);
        let offset = scene.camera.u.scale(0.01);
        let offset_y = scene.camera.v.scale(0.01);
        let mut rng = StdRng::seed_from_u64(0);
        let color = adaptive_sample(&scene, &config, edge, offset, offset_y, 0, &mut rng);
        assert!(color.0 > 0.05 && color.0 < 0.95, "expected a blend, got {color:?}");
    }
}
