//! Movement tuning.
//!
//! All quantities are per tick at the fixed simulation rate, in pixels.
//! The defaults are the hand-tuned values the game ships with; a TOML file
//! can override any subset of them.

use std::path::Path;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an alternative tuning file.
pub const CONFIG_ENV: &str = "WALLHOP_CONFIG";
/// Tuning file read when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/movement.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Body
    // ========================================================================
    /// Hit box width (pixels).
    pub body_width: f32,

    /// Hit box height (pixels).
    pub body_height: f32,

    // ========================================================================
    // Motion
    // ========================================================================
    /// Downward acceleration while airborne.
    pub gravity: f32,

    /// Horizontal thrust while grounded.
    pub ground_acceleration: f32,

    /// Fraction of ground thrust available in the air.
    pub air_control: f32,

    /// Multiplier applied to the whole acceleration while airborne.
    pub drag: f32,

    /// Horizontal speeds below this snap to zero.
    pub velocity_snap: f32,

    pub max_fall_velocity: f32,

    pub max_jump_velocity: f32,

    // ========================================================================
    // Jumping
    // ========================================================================
    /// Upward speed given by a jump or double jump.
    pub jump_impulse: f32,

    /// Upward speed kept when jump is released early.
    pub jump_cut_velocity: f32,

    /// Outward speed given by a wall jump.
    pub wall_jump_push: f32,

    /// Upward speed given by a wall jump.
    pub wall_jump_impulse: f32,

    // ========================================================================
    // Abilities
    // ========================================================================
    /// Horizontal thrust multiplier while sprinting.
    pub sprint_multiplier: f32,

    /// Offset applied by a teleport dash.
    pub teleport_distance: f32,

    /// Analog inputs must exceed this magnitude to register.
    pub input_deadzone: f32,

    // ========================================================================
    // Energy
    // ========================================================================
    pub max_energy: f32,

    pub energy_regen: f32,

    /// Debited every tick a wall grab holds.
    pub grab_cost: f32,

    /// Debited every tick a sprint holds.
    pub sprint_cost: f32,

    /// Time regeneration stays off after the meter empties (milliseconds).
    pub energy_cooldown_ms: u64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            body_width: 32.0,
            body_height: 32.0,

            gravity: 1.0,
            ground_acceleration: 2.0,
            air_control: 0.2,
            drag: 0.9,
            velocity_snap: 0.1,
            max_fall_velocity: 15.0,
            max_jump_velocity: 20.0,

            jump_impulse: 20.0,
            jump_cut_velocity: 1.0,
            wall_jump_push: 10.0,
            wall_jump_impulse: 20.0,

            sprint_multiplier: 3.0,
            teleport_distance: 128.0,
            input_deadzone: 0.85,

            max_energy: 100.0,
            energy_regen: 0.5,
            grab_cost: 5.0,
            sprint_cost: 1.0,
            energy_cooldown_ms: 2000,
        }
    }
}

impl MovementConfig {
    /// Parse a TOML tuning file. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from [`CONFIG_ENV`] or [`DEFAULT_CONFIG_PATH`]. Falls back to
    /// defaults if the file is missing or unparseable.
    pub fn load_or_default() -> Self {
        let path =
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded movement config from {path}");
                config
            }
            Err(ConfigError::Io { .. }) => Self::default(),
            Err(e) => {
                log::warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    pub fn body_size(&self) -> Vec2 {
        Vec2::new(self.body_width, self.body_height)
    }

    pub fn energy_cooldown(&self) -> Duration {
        Duration::from_millis(self.energy_cooldown_ms)
    }

    /// Horizontal thrust for the current support state.
    pub fn thrust(&self, grounded: bool) -> f32 {
        if grounded {
            self.ground_acceleration
        } else {
            self.air_control * self.ground_acceleration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = MovementConfig::default();
        assert!(config.gravity > 0.0);
        assert!(config.drag > 0.0 && config.drag < 1.0);
        assert!(config.max_jump_velocity >= config.jump_impulse);
        assert!(config.grab_cost <= config.max_energy);
    }

    #[test]
    fn air_thrust_is_diminished() {
        let config = MovementConfig::default();
        assert_eq!(config.thrust(true), 2.0);
        assert!((config.thrust(false) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = MovementConfig::from_toml(
            r#"
            gravity = 2.0
            teleport_distance = 64.0
            "#,
        )
        .unwrap();
        assert_eq!(config.gravity, 2.0);
        assert_eq!(config.teleport_distance, 64.0);
        assert_eq!(config.jump_impulse, MovementConfig::default().jump_impulse);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(MovementConfig::from_toml("gravity = \"heavy\"").is_err());
    }

    #[test]
    fn shipped_file_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/movement.toml");
        assert_eq!(MovementConfig::load(path).unwrap(), MovementConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = MovementConfig::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
