//! Static scene configuration, loadable from YAML or JSON.

use glam::Vec3;
use lightbox_scene::{GridSpec, SceneError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or checking a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
    #[error("unrecognized light type `{0}`, falling back to a point light")]
    UnrecognizedLightType(String),
    #[error("invalid grid: {0}")]
    InvalidGrid(String),
    #[error("`{field}` must be {expected}, got {value}")]
    InvalidIntensity {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
    #[error("grid_count {count} exceeds the limit of {max} boxes per side")]
    GridTooLarge { count: u32, max: u32 },
}

/// Largest accepted `grid_count`; 100x100 boxes plus the ground and the
/// marker fit the renderer's per-frame instance budget.
pub const MAX_GRID_COUNT: u32 = 100;

impl From<SceneError> for ConfigError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::InvalidGrid(reason) => Self::InvalidGrid(reason),
            other => Self::InvalidGrid(other.to_string()),
        }
    }
}

/// Which shadow-casting light the composer builds.
///
/// Parsed case-insensitively. Anything else is kept verbatim so the composer
/// can report it and fall back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LightType {
    Point,
    Directional,
    Spot,
    Unrecognized(String),
}

impl From<String> for LightType {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Self::Point,
            "directional" => Self::Directional,
            "spot" => Self::Spot,
            _ => Self::Unrecognized(s),
        }
    }
}

impl From<&str> for LightType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<LightType> for String {
    fn from(t: LightType) -> Self {
        t.to_string()
    }
}

impl std::fmt::Display for LightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Point => f.write_str("point"),
            Self::Directional => f.write_str("directional"),
            Self::Spot => f.write_str("spot"),
            Self::Unrecognized(s) => f.write_str(s),
        }
    }
}

/// Viewer camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(20.0, 22.0, 32.0),
            target: Vec3::ZERO,
            fov_degrees: 45.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

/// Everything the composer needs to assemble a scene.
///
/// All fields are optional in files; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub light_type: LightType,
    pub light_intensity: f32,
    pub enable_ambient_light: bool,
    pub ambient_light_intensity: f32,
    pub enable_light_helper: bool,
    pub enable_light_camera_helper: bool,
    pub smooth_shadow: bool,
    pub grid_count: u32,
    pub grid_spacing: f32,
    /// Name of the object the frame driver animates, if any.
    pub animated_object: Option<String>,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            light_type: LightType::Spot,
            light_intensity: 2.0,
            enable_ambient_light: true,
            ambient_light_intensity: 0.2,
            enable_light_helper: true,
            enable_light_camera_helper: false,
            smooth_shadow: true,
            grid_count: 10,
            grid_spacing: 1.5,
            animated_object: None,
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn grid(&self) -> GridSpec {
        GridSpec {
            count: self.grid_count,
            spacing: self.grid_spacing,
        }
    }

    /// Check grid parameters and intensities. The light type is not checked
    /// here; an unrecognized one is handled during composition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid().validate()?;
        if self.grid_count > MAX_GRID_COUNT {
            return Err(ConfigError::GridTooLarge {
                count: self.grid_count,
                max: MAX_GRID_COUNT,
            });
        }

        let value = self.light_intensity;
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::InvalidIntensity {
                field: "light_intensity",
                expected: "a positive number",
                value,
            });
        }
        let value = self.ambient_light_intensity;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidIntensity {
                field: "ambient_light_intensity",
                expected: "a non-negative number",
                value,
            });
        }
        Ok(())
    }

    /// Load and validate a config file. Format is chosen by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let data = std::fs::read_to_string(path)?;
        let config: Self = match ext.as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&data)?,
            Some("json") => serde_json::from_str(&data)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), light = %config.light_type, "loaded scene config");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_type_parses_case_insensitively() {
        assert_eq!(LightType::from("Spot"), LightType::Spot);
        assert_eq!(LightType::from("DIRECTIONAL"), LightType::Directional);
        assert_eq!(LightType::from(" point "), LightType::Point);
        assert_eq!(
            LightType::from("laser"),
            LightType::Unrecognized("laser".into())
        );
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config: SceneConfig =
            serde_yaml::from_str("light_type: directional\ngrid_count: 3\n").unwrap();
        assert_eq!(config.light_type, LightType::Directional);
        assert_eq!(config.grid_count, 3);
        assert_eq!(config.grid_spacing, SceneConfig::default().grid_spacing);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn unknown_light_type_survives_deserialization() {
        let config: SceneConfig = serde_json::from_str(r#"{"light_type": "hemisphere"}"#).unwrap();
        assert_eq!(
            config.light_type,
            LightType::Unrecognized("hemisphere".into())
        );
        // Still a valid config; composition reports the fallback.
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_round_trip() {
        let config = SceneConfig {
            animated_object: Some("box-0-0".into()),
            ..SceneConfig::default()
        };
        let text = config.to_yaml().unwrap();
        assert!(text.contains("light_type: spot"));
        let back: SceneConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero_grid = SceneConfig {
            grid_count: 0,
            ..SceneConfig::default()
        };
        assert!(matches!(zero_grid.validate(), Err(ConfigError::InvalidGrid(_))));

        let bad_spacing = SceneConfig {
            grid_spacing: -1.0,
            ..SceneConfig::default()
        };
        assert!(matches!(bad_spacing.validate(), Err(ConfigError::InvalidGrid(_))));

        let negative = SceneConfig {
            light_intensity: -0.5,
            ..SceneConfig::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ConfigError::InvalidIntensity {
                field: "light_intensity",
                ..
            })
        ));
    }

    #[test]
    fn light_intensity_must_be_positive() {
        let dark = SceneConfig {
            light_intensity: 0.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            dark.validate(),
            Err(ConfigError::InvalidIntensity {
                field: "light_intensity",
                ..
            })
        ));

        // Ambient may be switched off with zero.
        let no_ambient = SceneConfig {
            ambient_light_intensity: 0.0,
            ..SceneConfig::default()
        };
        assert!(no_ambient.validate().is_ok());
    }

    #[test]
    fn grid_count_is_capped() {
        let largest = SceneConfig {
            grid_count: MAX_GRID_COUNT,
            ..SceneConfig::default()
        };
        assert!(largest.validate().is_ok());

        let huge = SceneConfig {
            grid_count: 120,
            ..SceneConfig::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::GridTooLarge { count: 120, max: MAX_GRID_COUNT })
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.yaml");
        std::fs::write(&path, "grid_count: 120\n").unwrap();
        assert!(matches!(
            SceneConfig::from_path(&path),
            Err(ConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn from_path_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("scene.yml");
        std::fs::write(&yaml, "light_type: point\nsmooth_shadow: false\n").unwrap();
        let config = SceneConfig::from_path(&yaml).unwrap();
        assert_eq!(config.light_type, LightType::Point);
        assert!(!config.smooth_shadow);

        let json = dir.path().join("scene.json");
        std::fs::write(&json, SceneConfig::default().to_json().unwrap()).unwrap();
        assert_eq!(SceneConfig::from_path(&json).unwrap(), SceneConfig::default());

        let toml = dir.path().join("scene.toml");
        std::fs::write(&toml, "").unwrap();
        assert!(matches!(
            SceneConfig::from_path(&toml),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn from_path_reports_missing_file_and_bad_grid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SceneConfig::from_path(dir.path().join("missing.yaml")),
            Err(ConfigError::Io(_))
        ));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "grid_count: 0\n").unwrap();
        assert!(matches!(
            SceneConfig::from_path(&bad),
            Err(ConfigError::InvalidGrid(_))
        ));
    }
}
