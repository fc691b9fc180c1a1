use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(String),
}

/// Raytracer properties, read from a `.config` file.
#[derive(Clone, Debug)]
pub struct Config {
    pub scene_path: PathBuf,
    pub output_path: PathBuf,
    /// Maximum ray reflections / refractions.
    pub depth: u32,
    pub width: u32,
    pub height: u32,
    /// Total samples for antialiasing; doubles as the recursion cap of the
    /// adaptive sampler.
    pub antialiasing_samples: u32,
    pub adaptive_antialiasing: bool,
    pub shadow_samples: u32,
    pub dof_samples: u32,
    pub reflection_samples: u32,
    pub window: bool,
    /// Contact-point offset along the normal.
    pub epsilon: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scene_path: PathBuf::from("scene/RefractScene.txt"),
            output_path: PathBuf::from("output/zout.png"),
            depth: 10,
            width: 500,
            height: 500,
            antialiasing_samples: 10,
            adaptive_antialiasing: false,
            shadow_samples: 1,
            dof_samples: 1,
            reflection_samples: 1,
            window: true,
            epsilon: 0.01,
        }
    }
}

impl Config {
    /// A missing file yields the defaults; a malformed one is fatal.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(data) => Config::parse(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// First two tokens are the scene and output paths; the rest is
    /// scanned for numbers in field order, so label words between values
    /// are allowed and ignored.
    pub fn parse(data: &str) -> Result<Config, ConfigError> {
        let mut tokens = data.split_whitespace();

        let scene_path = tokens
            .next()
            .ok_or_else(|| ConfigError::Parse("missing scene path".into()))?;
        let output_path = tokens
            .next()
            .ok_or_else(|| ConfigError::Parse("missing output path".into()))?;

        let values: Vec<f32> = tokens.filter_map(|t| t.parse().ok()).collect();
        if values.len() < 11 {
            return Err(ConfigError::Parse(format!(
                "expected 11 numeric fields, found {}",
                values.len()
            )));
        }

        let dof = values[6] != 0.0;
        Ok(Config {
            scene_path: PathBuf::from(scene_path),
            output_path: PathBuf::from(output_path),
            depth: values[0] as u32,
            width: values[1] as u32,
            height: values[2] as u32,
            antialiasing_samples: values[3] as u32,
            adaptive_antialiasing: values[4] != 0.0,
            shadow_samples: values[5] as u32,
            dof_samples: if dof { values[7] as u32 } else { 1 },
            reflection_samples: values[8] as u32,
            window: values[9] != 0.0,
            epsilon: values[10],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/prism.config")).unwrap();
        assert_eq!(config.depth, 10);
        assert_eq!(config.width, 500);
        assert_eq!(config.height, 500);
        assert_eq!(config.antialiasing_samples, 10);
        assert!(!config.adaptive_antialiasing);
        assert_eq!(config.shadow_samples, 1);
        assert_eq!(config.dof_samples, 1);
        assert_eq!(config.reflection_samples, 1);
        assert!(config.window);
        assert!((config.epsilon - 0.01).abs() < 1e-6);
    }

    #[test]
    fn parses_bare_fields() {
        let config = Config::parse(
            "scene/test.txt out.png 6 320 240 4 1 8 1 16 2 0 0.001",
        )
        .unwrap();
        assert_eq!(config.scene_path, PathBuf::from("scene/test.txt"));
        assert_eq!(config.output_path, PathBuf::from("out.png"));
        assert_eq!(config.depth, 6);
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 240);
        assert_eq!(config.antialiasing_samples, 4);
        assert!(config.adaptive_antialiasing);
        assert_eq!(config.shadow_samples, 8);
        assert_eq!(config.dof_samples, 16);
        assert_eq!(config.reflection_samples, 2);
        assert!(!config.window);
        assert!((config.epsilon - 0.001).abs() < 1e-9);
    }

    #[test]
    fn labels_between_values_are_ignored() {
        let config = Config::parse(
            "in.txt out.png\n\
             DEPTH 5\n\
             RESOLUTION 100 200\n\
             AA 9\n\
             ADAPTIVE 0\n\
             SHADOW 2\n\
             DOF 1 4\n\
             REFLECTION 3\n\
             WINDOW 1\n\
             EPSILON 0.05\n",
        )
        .unwrap();
        assert_eq!(config.depth, 5);
        assert_eq!(config.width, 100);
        assert_eq!(config.height, 200);
        assert_eq!(config.antialiasing_samples, 9);
        assert_eq!(config.dof_samples, 4);
        assert!(config.window);
    }

    #[test]
    fn dof_flag_off_collapses_samples() {
        let config = Config::parse("in.txt out.png 6 100 100 4 0 1 0 16 1 0 0.01").unwrap();
        assert_eq!(config.dof_samples, 1);
    }

    #[test]
    fn truncated_config_is_fatal() {
        assert!(matches!(
            Config::parse("in.txt out.png 6 100"),
            Err(ConfigError::Parse(_))
        ));
    }
}
