mod algebra;
mod camera;
mod config;
mod cuboid;
mod ellipsoid;
mod light;
mod material;
mod mesh;
mod polygon;
mod preview;
mod primitive;
mod ray;
mod renderer;
mod sampling;
mod scene;
mod shader;
mod sphere;

use crate::config::Config;
use crate::scene::Scene;
use env_logger::Env;
use image::RgbImage;
use log::{error, info};
use std::env;
use std::error::Error;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    // optional override of the default config location
    let config_path = env::args().nth(1).unwrap_or_else(|| ".config".to_string());
    let config = Config::load(Path::new(&config_path))?;

    info!(
        "generating image for scene {} at {}x{}",
        config.scene_path.display(),
        config.width,
        config.height
    );

    let scene = Scene::load(&config.scene_path)?;

    let seed = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs());
    let buffer = renderer::trace_scene(&scene, &config, seed)?;

    if let Some(dir) = config.output_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let image = RgbImage::from_raw(config.width, config.height, buffer)
        .ok_or("output buffer does not match the configured resolution")?;
    image.save(&config.output_path)?;

    info!("saved {}", config.output_path.display());
    Ok(())
}
