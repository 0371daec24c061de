//! Engine configuration.
//!
//! Every section falls back to the build-time defaults, so a configuration
//! file only needs to name the values it overrides:
//! ```yaml
//! camera:
//!   movement_speed: 20.0
//! outline:
//!   margin: 0.05
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lower bound for the camera field of view, in degrees.
pub const MIN_FOV: f32 = 1.0;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Window and projection options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub v_sync: bool,
    pub fullscreen: bool,
    /// Show the OS cursor while the window has focus.
    pub show_mouse: bool,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            v_sync: true,
            fullscreen: false,
            show_mouse: false,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

/// Camera defaults. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub yaw: f32,
    pub pitch: f32,
    /// World units per second.
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub fov: f32,
    /// Upper bound for zooming out with the scroll wheel.
    pub max_fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw: -90.0,
            pitch: 0.0,
            movement_speed: 40.0,
            mouse_sensitivity: 0.10,
            fov: 100.0,
            max_fov: 100.0,
        }
    }
}

/// Outline post-pass settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Added to the scale on each axis for the outline draw.
    pub margin: f32,
    /// RGBA colour used by backends that shade the outline with a flat colour.
    pub color: [f32; 4],
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            margin: 0.025,
            color: [1.0, 0.55, 0.1, 1.0],
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub graphics: GraphicsConfig,
    pub camera: CameraConfig,
    pub outline: OutlineConfig,
}

impl EngineConfig {
    /// Load and validate a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate a YAML document. An empty document yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.graphics;
        let c = &self.camera;
        let floats = [
            ("graphics.near_plane", g.near_plane),
            ("graphics.far_plane", g.far_plane),
            ("camera.yaw", c.yaw),
            ("camera.pitch", c.pitch),
            ("camera.movement_speed", c.movement_speed),
            ("camera.mouse_sensitivity", c.mouse_sensitivity),
            ("camera.fov", c.fov),
            ("camera.max_fov", c.max_fov),
            ("outline.margin", self.outline.margin),
        ];
        let color = self.outline.color.iter().map(|&v| ("outline.color", v));
        // NaN slips past every ordered comparison below.
        if let Some((name, value)) = floats.into_iter().chain(color).find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
        }

        if g.near_plane <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "near_plane must be positive, got {}",
                g.near_plane
            )));
        }
        if g.far_plane <= g.near_plane {
            return Err(ConfigError::Invalid(format!(
                "far_plane ({}) must be greater than near_plane ({})",
                g.far_plane, g.near_plane
            )));
        }

        if c.max_fov < MIN_FOV {
            return Err(ConfigError::Invalid(format!(
                "max_fov must be at least {MIN_FOV}, got {}",
                c.max_fov
            )));
        }
        if !(MIN_FOV..=c.max_fov).contains(&c.fov) {
            return Err(ConfigError::Invalid(format!(
                "fov ({}) must lie in [{MIN_FOV}, {}]",
                c.fov, c.max_fov
            )));
        }
        if c.movement_speed < 0.0 || c.mouse_sensitivity < 0.0 {
            return Err(ConfigError::Invalid(
                "movement_speed and mouse_sensitivity must not be negative".into(),
            ));
        }

        if self.outline.margin < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "outline margin must not be negative, got {}",
                self.outline.margin
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.camera.yaw, -90.0);
        assert_eq!(config.camera.movement_speed, 40.0);
        assert_eq!(config.outline.margin, 0.025);
        assert_eq!(config.graphics.far_plane, 1000.0);
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_yaml_str("   \n").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = EngineConfig::from_yaml_str("camera:\n  movement_speed: 12.5\n").unwrap();
        assert_eq!(config.camera.movement_speed, 12.5);
        assert_eq!(config.camera.fov, 100.0);
        assert_eq!(config.graphics, GraphicsConfig::default());
        assert_eq!(config.outline, OutlineConfig::default());
    }

    #[test]
    fn far_plane_must_exceed_near_plane() {
        let err = EngineConfig::from_yaml_str("graphics:\n  near_plane: 5.0\n  far_plane: 1.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn fov_outside_bounds_rejected() {
        let err = EngineConfig::from_yaml_str("camera:\n  fov: 120.0\n  max_fov: 90.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn negative_outline_margin_rejected() {
        let mut config = EngineConfig::default();
        config.outline.margin = -0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn non_finite_values_rejected() {
        for doc in [
            "graphics:\n  near_plane: .nan\n",
            "graphics:\n  far_plane: .inf\n",
            "camera:\n  mouse_sensitivity: .nan\n",
            "camera:\n  yaw: -.inf\n",
            "outline:\n  margin: .nan\n",
            "outline:\n  color: [1.0, .nan, 0.0, 1.0]\n",
        ] {
            let err = EngineConfig::from_yaml_str(doc).unwrap_err();
            match err {
                ConfigError::Invalid(msg) => assert!(msg.contains("finite"), "{doc}: {msg}"),
                other => panic!("{doc}: expected Invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = EngineConfig::from_yaml_str("camera: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "outline:\n  margin: 0.05\ngraphics:\n  v_sync: false").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.outline.margin, 0.05);
        assert!(!config.graphics.v_sync);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn yaml_roundtrip_preserves_values() {
        let mut config = EngineConfig::default();
        config.camera.pitch = 12.0;
        let text = config.to_yaml().unwrap();
        assert_eq!(EngineConfig::from_yaml_str(&text).unwrap(), config);
    }
}
