pub mod flags;

use serde::Deserialize;

pub use self::flags::{InfoFlags, TileFlags};

/*──────────────────────── floor constants ───────────────────────*/

/// Highest floor index; floors run `0 ..= MAX_Z`, 0 being the sky-most.
pub const MAX_Z: u8 = 15;
/// Ground level. Floors above it are outdoors.
pub const SEA_FLOOR: u8 = 7;
/// First floor below sea level.
pub const UNDERGROUND_FLOOR: u8 = SEA_FLOOR + 1;
/// How many floors above/below the camera stay visible underground.
pub const AWARE_UNDERGROUND_FLOOR_RANGE: u8 = 2;
/// Number of floor slots kept by per-floor caches.
pub const FLOOR_COUNT: usize = MAX_Z as usize + 1;

/// Pixels per tile at scale factor 1.
pub const SPRITE_SIZE: i32 = 32;

/// Half-extent (tiles) around the camera kept see-through in
/// [`FloorViewMode::AlwaysWithTransparency`].
pub const TRANSPARENT_FLOOR_VIEW_RANGE: i32 = 2;
/// Upper-floor opacity inside [`TRANSPARENT_FLOOR_VIEW_RANGE`].
pub const TRANSPARENT_NEAR_OPACITY: f32 = 0.16;
/// Upper-floor opacity outside [`TRANSPARENT_FLOOR_VIEW_RANGE`].
pub const TRANSPARENT_FAR_OPACITY: f32 = 0.7;

/// Ambient intensity at or above which the light layer adds nothing.
pub const DARK_THRESHOLD: u8 = 250;

/*──────────────────────── view modes ────────────────────────────*/

/// How floors above the camera are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorViewMode {
    /// Floors above the first occluding tile are hidden.
    #[default]
    Normal,
    /// Like `Normal`, but hidden/revealed floors cross-fade.
    Fade,
    /// First visible floor pinned to the camera floor.
    Locked,
    /// Occluders are ignored; every floor above is drawn.
    Always,
    /// Floors above are drawn, but translucent around the camera.
    AlwaysWithTransparency,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntialiasingMode {
    Disabled,
    #[default]
    Enabled,
    /// Draws at twice the resolution, then filters down.
    SmoothRetro,
}

impl AntialiasingMode {
    #[inline]
    pub fn scale_factor(self) -> f32 {
        match self {
            AntialiasingMode::SmoothRetro => 2.0,
            _ => 1.0,
        }
    }

    #[inline]
    pub fn is_smooth(self) -> bool {
        self != AntialiasingMode::Disabled
    }
}
