//! Configuration system
//!
//! Scene defaults (sun light, environment, new views, resource table
//! capacity) are plain serde structures that can be loaded from TOML or RON.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Parameters of the singleton directional ("sun") light created with the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    /// Direction the light travels in (normalized on use)
    pub direction: [f32; 3],
    /// Linear RGB color
    pub color: [f32; 3],
    /// Illuminance in lux
    pub intensity: f32,
    /// Whether the sun contributes to the frame
    pub enabled: bool,
    /// Whether the sun casts shadows
    pub cast_shadows: bool,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            direction: [0.577, -0.577, -0.577],
            color: [1.0, 1.0, 1.0],
            intensity: 10_000.0,
            enabled: true,
            cast_shadows: true,
        }
    }
}

/// Indirect light and skybox defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Intensity applied to a freshly bound indirect light
    pub indirect_light_intensity: f32,
    /// Whether indirect lighting contributes when bound
    pub indirect_light_enabled: bool,
    /// Whether the skybox is shown when bound
    pub skybox_enabled: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            indirect_light_intensity: 30_000.0,
            indirect_light_enabled: true,
            skybox_enabled: false,
        }
    }
}

/// Defaults for views created with `add_view`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// RGBA clear color
    pub clear_color: [f32; 4],
    /// Whether shadow passes run for the view
    pub shadowing: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            shadowing: true,
        }
    }
}

/// In-memory resource table sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Maximum number of live resources (0 = unlimited)
    pub max_resources: usize,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self { max_resources: 0 }
    }
}

/// Top-level scene configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Sun light parameters
    pub sun: SunConfig,
    /// Environment lighting defaults
    pub environment: EnvironmentConfig,
    /// New view defaults
    pub views: ViewConfig,
    /// Resource table sizing
    pub resources: ResourceConfig,
}

impl Config for SceneConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip() {
        let mut config = SceneConfig::default();
        config.sun.intensity = 50_000.0;
        config.views.shadowing = false;

        let text = toml::to_string_pretty(&config).expect("serialize");
        let parsed: SceneConfig = toml::from_str(&text).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let parsed: SceneConfig = ron::from_str("(sun: (intensity: 5.0))").expect("parse");
        assert_eq!(parsed.sun.intensity, 5.0);
        assert!(parsed.sun.enabled);
        assert_eq!(parsed.environment, EnvironmentConfig::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = SceneConfig::default().save_to_file("scene.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("scene_core_config_{}.toml", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        let config = SceneConfig::default();
        config.save_to_file(&path).expect("save");
        let loaded = SceneConfig::load_from_file(&path).expect("load");
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
