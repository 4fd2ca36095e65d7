//! Map view settings, loadable from TOML.
//!
//! ```toml
//! visible_dimension = [15, 11]
//! floor_view_mode   = "fade"
//! antialiasing      = "smooth_retro"
//! floor_fading_ms   = 500
//! draw_lights       = true
//! crosshair         = "images/crosshair.png"
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::path::Path;
use std::time::Duration;

use glam::{IVec2, ivec2};
use serde::Deserialize;
use thiserror::Error;

use crate::defs::{AntialiasingMode, FloorViewMode};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Tiles shown across and down; both odd and at least 3.
    pub visible_dimension: [i32; 2],
    pub floor_view_mode: FloorViewMode,
    pub antialiasing: AntialiasingMode,
    pub floor_fading_ms: u64,
    /// Darkening of the floor right below the camera, `0.0 ..= 1.0`.
    pub shadow_floor_intensity: f32,
    pub draw_lights: bool,
    /// Lower bound of the ambient light, `0.0 ..= 1.0`.
    pub minimum_ambient_light: f32,
    pub draw_names: bool,
    pub draw_health_bars: bool,
    pub draw_mana_bar: bool,
    pub draw_texts: bool,
    pub draw_highlight_target: bool,
    pub effects_on_top: bool,
    pub crosshair: Option<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            visible_dimension: [15, 11],
            floor_view_mode: FloorViewMode::Normal,
            antialiasing: AntialiasingMode::Enabled,
            floor_fading_ms: 500,
            shadow_floor_intensity: 0.0,
            draw_lights: false,
            minimum_ambient_light: 0.0,
            draw_names: true,
            draw_health_bars: true,
            draw_mana_bar: true,
            draw_texts: true,
            draw_highlight_target: false,
            effects_on_top: true,
            crosshair: None,
        }
    }
}

impl ViewConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    #[inline]
    pub fn visible(&self) -> IVec2 {
        ivec2(self.visible_dimension[0], self.visible_dimension[1])
    }

    #[inline]
    pub fn floor_fading(&self) -> Duration {
        Duration::from_millis(self.floor_fading_ms)
    }
}
