//! Sandbox configuration, loaded from JSON.
//!
//! Every section is optional; missing fields fall back to their defaults.

use std::path::Path;

use locomotion::{CameraSettings, CharacterSettings, Vec3};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SandboxError};
use crate::kcc_settings::KccSettings;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Fixed physics tick rate (Hz).
    pub tick_rate_hz: f32,
    /// Where the character's feet start.
    pub spawn: [f32; 3],
    pub character: CharacterSettings,
    pub camera: CameraSettings,
    pub kcc: KccSettings,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            spawn: [0.0, 0.5, 0.0],
            character: CharacterSettings::default(),
            camera: CameraSettings::default(),
            kcc: KccSettings::default(),
        }
    }
}

impl SandboxConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SandboxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| SandboxError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!("loaded config from {} ({} Hz)", path.display(), config.tick_rate_hz);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_hz.is_nan() || self.tick_rate_hz <= 0.0 {
            return Err(SandboxError::InvalidConfig(format!(
                "tick_rate_hz must be positive, got {}",
                self.tick_rate_hz
            )));
        }

        let c = &self.character;
        if c.capsule_radius.is_nan() || c.capsule_radius <= 0.0 {
            return Err(SandboxError::InvalidConfig(format!(
                "character.capsule_radius must be positive, got {}",
                c.capsule_radius
            )));
        }
        for (name, height) in [("stand_height", c.stand_height), ("crouch_height", c.crouch_height)] {
            if height.is_nan() || height <= 0.0 {
                return Err(SandboxError::InvalidConfig(format!(
                    "character.{name} must be positive, got {height}"
                )));
            }
        }
        if c.crouch_height > c.stand_height {
            return Err(SandboxError::InvalidConfig(format!(
                "character.crouch_height ({}) exceeds stand_height ({})",
                c.crouch_height, c.stand_height
            )));
        }
        if c.capsule_radius * 2.0 > c.crouch_height {
            return Err(SandboxError::InvalidConfig(format!(
                "character.capsule_radius ({}) does not fit a crouch_height of {}",
                c.capsule_radius, c.crouch_height
            )));
        }

        Ok(())
    }

    #[inline]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }

    #[inline]
    pub fn spawn_position(&self) -> Vec3 {
        Vec3::from(self.spawn)
    }
}
