//! Game configuration resource.
//!
//! Manages engine settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [physics]
//! fixed_step = 0.02
//! correction_fraction = 0.2
//! penetration_slop = 0.01
//! max_steps_warning = 10
//!
//! [render]
//! width = 640
//! height = 360
//!
//! [camera]
//! size = 1.0
//!
//! [layers]
//! names = player, enemy, ghost
//! ignore = ghost:player, ghost:enemy
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;
use thiserror::Error;

use crate::resources::camera::{Camera, CameraError};
use crate::resources::fixedtimestep::FIXED_STEP;
use crate::resources::physicssettings::{
    DEFAULT_CORRECTION_FRACTION, DEFAULT_MAX_STEPS_WARNING, DEFAULT_PENETRATION_SLOP, LayerError,
    PhysicsSettings,
};

/// Default safe values for startup
const DEFAULT_RENDER_WIDTH: u32 = 640;
const DEFAULT_RENDER_HEIGHT: u32 = 360;
const DEFAULT_CAMERA_SIZE: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file: {0}")]
    Load(String),
    #[error("failed to save config file: {0}")]
    Save(String),
    #[error("invalid value for [{section}] {key}: {message}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        message: String,
    },
}

/// Engine configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Internal render width in pixels.
    pub render_width: u32,
    /// Internal render height in pixels.
    pub render_height: u32,
    /// World units per screen pixel.
    pub camera_size: f32,
    /// Physics step in seconds.
    pub fixed_step: f64,
    pub correction_fraction: f32,
    pub penetration_slop: f32,
    pub max_steps_warning: u32,
    /// Extra layers besides the built-in ones.
    pub layers: Vec<String>,
    /// Layer pairs that must not interact.
    pub ignored_layer_pairs: Vec<(String, String)>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_pairs(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    parse_list(raw)
        .into_iter()
        .map(|item| match item.split_once(':') {
            Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
                Ok((a.trim().to_string(), b.trim().to_string()))
            }
            _ => Err(ConfigError::InvalidValue {
                section: "layers",
                key: "ignore",
                message: format!("expected 'a:b', found '{item}'"),
            }),
        })
        .collect()
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            render_width: DEFAULT_RENDER_WIDTH,
            render_height: DEFAULT_RENDER_HEIGHT,
            camera_size: DEFAULT_CAMERA_SIZE,
            fixed_step: FIXED_STEP,
            correction_fraction: DEFAULT_CORRECTION_FRACTION,
            penetration_slop: DEFAULT_PENETRATION_SLOP,
            max_steps_warning: DEFAULT_MAX_STEPS_WARNING,
            layers: Vec::new(),
            ignored_layer_pairs: Vec::new(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config.load(&self.config_path).map_err(ConfigError::Load)?;
        self.apply_ini(&config)?;
        info!(
            "Loaded config: {}x{} render, step={}s, {} extra layers",
            self.render_width,
            self.render_height,
            self.fixed_step,
            self.layers.len()
        );
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config.read(text.to_string()).map_err(ConfigError::Load)?;
        self.apply_ini(&config)
    }

    fn apply_ini(&mut self, config: &Ini) -> Result<(), ConfigError> {
        let invalid = |section, key, message: String| ConfigError::InvalidValue {
            section,
            key,
            message,
        };

        // [physics] section
        if let Some(step) = config
            .getfloat("physics", "fixed_step")
            .map_err(|e| invalid("physics", "fixed_step", e))?
        {
            if step <= 0.0 || !step.is_finite() {
                return Err(invalid("physics", "fixed_step", format!("{step} is not positive")));
            }
            self.fixed_step = step;
        }
        if let Some(v) = config
            .getfloat("physics", "correction_fraction")
            .map_err(|e| invalid("physics", "correction_fraction", e))?
        {
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid(
                    "physics",
                    "correction_fraction",
                    format!("{v} is outside [0, 1]"),
                ));
            }
            self.correction_fraction = v as f32;
        }
        if let Some(v) = config
            .getfloat("physics", "penetration_slop")
            .map_err(|e| invalid("physics", "penetration_slop", e))?
        {
            if v < 0.0 || !v.is_finite() {
                return Err(invalid("physics", "penetration_slop", format!("{v} is negative")));
            }
            self.penetration_slop = v as f32;
        }
        if let Some(v) = config
            .getuint("physics", "max_steps_warning")
            .map_err(|e| invalid("physics", "max_steps_warning", e))?
        {
            self.max_steps_warning = u32::try_from(v)
                .map_err(|e| invalid("physics", "max_steps_warning", e.to_string()))?;
        }

        // [render] section
        let pixels = |key: &'static str| -> Result<Option<u32>, ConfigError> {
            match config
                .getuint("render", key)
                .map_err(|e| invalid("render", key, e))?
            {
                Some(0) => Err(invalid("render", key, "must be positive".to_string())),
                Some(v) => u32::try_from(v)
                    .map(Some)
                    .map_err(|e| invalid("render", key, e.to_string())),
                None => Ok(None),
            }
        };
        if let Some(width) = pixels("width")? {
            self.render_width = width;
        }
        if let Some(height) = pixels("height")? {
            self.render_height = height;
        }

        // [camera] section
        if let Some(size) = config
            .getfloat("camera", "size")
            .map_err(|e| invalid("camera", "size", e))?
        {
            self.camera_size = size as f32;
        }

        // [layers] section
        if let Some(names) = config.get("layers", "names") {
            self.layers = parse_list(&names);
        }
        if let Some(pairs) = config.get("layers", "ignore") {
            self.ignored_layer_pairs = parse_pairs(&pairs)?;
        }
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut config = Ini::new();

        // [physics] section
        config.set("physics", "fixed_step", Some(self.fixed_step.to_string()));
        config.set(
            "physics",
            "correction_fraction",
            Some(self.correction_fraction.to_string()),
        );
        config.set(
            "physics",
            "penetration_slop",
            Some(self.penetration_slop.to_string()),
        );
        config.set(
            "physics",
            "max_steps_warning",
            Some(self.max_steps_warning.to_string()),
        );

        // [render] section
        config.set("render", "width", Some(self.render_width.to_string()));
        config.set("render", "height", Some(self.render_height.to_string()));

        // [camera] section
        config.set("camera", "size", Some(self.camera_size.to_string()));

        // [layers] section
        config.set("layers", "names", Some(self.layers.join(", ")));
        let pairs: Vec<String> = self
            .ignored_layer_pairs
            .iter()
            .map(|(a, b)| format!("{a}:{b}"))
            .collect();
        config.set("layers", "ignore", Some(pairs.join(", ")));
        config
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        self.to_ini()
            .write(&self.config_path)
            .map_err(|e| ConfigError::Save(e.to_string()))?;
        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }

    pub fn to_ini_string(&self) -> String {
        self.to_ini().writes()
    }

    /// Physics settings with the configured layers and tuning values.
    pub fn physics_settings(&self) -> Result<PhysicsSettings, LayerError> {
        let mut settings = PhysicsSettings::new();
        settings.fixed_step = self.fixed_step;
        settings.correction_fraction = self.correction_fraction;
        settings.penetration_slop = self.penetration_slop;
        settings.max_steps_warning = self.max_steps_warning;
        settings.ensure_layers(self.layers.iter().map(String::as_str))?;
        for (a, b) in &self.ignored_layer_pairs {
            settings.set_layers_interact(a, b, false)?;
        }
        if self.correction_fraction < 0.0 || self.correction_fraction > 1.0 {
            warn!(
                "correction_fraction {} is outside [0, 1]",
                self.correction_fraction
            );
        }
        Ok(settings)
    }

    /// Camera for the configured render resolution and size.
    pub fn camera(&self) -> Result<Camera, CameraError> {
        let mut camera = Camera::new(self.render_width, self.render_height)?;
        camera.set_size(self.camera_size)?;
        Ok(camera)
    }

    /// Set render resolution.
    pub fn set_render_size(&mut self, width: u32, height: u32) {
        self.render_width = width;
        self.render_height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_keep_defaults() {
        let mut config = GameConfig::new();
        config.load_from_str("[render]\nwidth = 800\n").unwrap();
        assert_eq!(config.render_width, 800);
        assert_eq!(config.render_height, DEFAULT_RENDER_HEIGHT);
        assert_eq!(config.fixed_step, FIXED_STEP);
    }

    #[test]
    fn layers_and_ignore_pairs_build_settings() {
        let mut config = GameConfig::new();
        config
            .load_from_str(
                "[layers]\nnames = player, ghost\nignore = ghost:player\n[physics]\nfixed_step = 0.01\n",
            )
            .unwrap();
        assert_eq!(config.layers, vec!["player".to_string(), "ghost".to_string()]);
        let settings = config.physics_settings().unwrap();
        assert_eq!(settings.fixed_step, 0.01);
        assert!(!settings.layers_interact("player", "ghost"));
        assert!(settings.layers_interact("player", "player"));
    }

    #[test]
    fn malformed_pair_is_rejected() {
        let mut config = GameConfig::new();
        let err = config.load_from_str("[layers]\nignore = ghost\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "ignore", .. }));
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let mut config = GameConfig::new();
        assert!(config.load_from_str("[physics]\nfixed_step = 0\n").is_err());
    }

    #[test]
    fn malformed_render_size_is_rejected() {
        let mut config = GameConfig::new();
        let err = config.load_from_str("[render]\nwidth = wide\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { section: "render", key: "width", .. }));
        let err = config.load_from_str("[render]\nheight = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "height", .. }));
        assert_eq!(config.render_width, DEFAULT_RENDER_WIDTH);
    }

    #[test]
    fn resolver_tuning_is_range_checked() {
        let mut config = GameConfig::new();
        for text in [
            "[physics]\ncorrection_fraction = -0.1\n",
            "[physics]\ncorrection_fraction = 1.5\n",
            "[physics]\npenetration_slop = -0.01\n",
        ] {
            assert!(config.load_from_str(text).is_err(), "{text}");
        }
        config
            .load_from_str("[physics]\ncorrection_fraction = 0.5\npenetration_slop = 0\n")
            .unwrap();
        assert_eq!(config.correction_fraction, 0.5);
        assert_eq!(config.penetration_slop, 0.0);
    }

    #[test]
    fn unknown_ignored_layer_fails_settings() {
        let mut config = GameConfig::new();
        config.ignored_layer_pairs = vec![("a".into(), "b".into())];
        assert_eq!(
            config.physics_settings().unwrap_err(),
            LayerError::Unknown("a".into())
        );
    }

    #[test]
    fn written_config_reads_back() {
        let mut config = GameConfig::new();
        config.layers = vec!["player".into()];
        config.ignored_layer_pairs = vec![("player".into(), "default".into())];
        config.camera_size = 2.0;
        let text = config.to_ini_string();
        let mut loaded = GameConfig::new();
        loaded.load_from_str(&text).unwrap();
        assert_eq!(loaded.layers, config.layers);
        assert_eq!(loaded.ignored_layer_pairs, config.ignored_layer_pairs);
        assert_eq!(loaded.camera_size, 2.0);
    }
}
