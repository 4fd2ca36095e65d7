//! Drawing abstraction layer.
//!
//! *The map view never touches a pixel buffer directly.*
//! It emits [`DrawCall`]s into named pools of a type implementing
//! [`DrawPool`], wrapped in opacity and shader state changes.
//!
//! * Back-ends decide what a "ground" or a "creature bar" looks like; the
//!   calls only say *where* and *in which order*.
//! * Everything a process-wide graphics singleton would normally answer
//!   (max texture size, shader support, texture lookup) is a pool method
//!   too, so tests can swap in [`RecordingPool`].

use glam::{IVec2, Vec2};

use crate::defs::InfoFlags;
use crate::world::{CreatureId, Light, Position, Rect, ThingId};

/// Pixel format of the software frame-buffer (0xAARRGGBB).
pub type Rgba = u32;

/// Backend handle for a loaded texture.
pub type TextureId = u16;

/// Backend handle for a compiled shader program.
pub type ShaderId = u16;

/// Named draw pools, composited by the backend in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolType {
    Map,
    CreatureInformation,
    Light,
    Text,
}

/// Uniform values handed to the map shader each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShaderUniforms {
    /// Source-rect centre, normalised to the buffer (y flipped).
    pub center_coord: Vec2,
    /// Top-left world tile of the buffer, normalised by buffer height.
    pub global_coord: Vec2,
    pub zoom: f32,
    /// Camera drift since the shader was set, normalised (y flipped).
    pub walk_offset: Vec2,
}

/// One tile shade collected for the light layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shade {
    pub dest: IVec2,
    pub opacity: f32,
}

/// Which text list a text call refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    Static,
    Animated,
}

/// A single primitive handed to the backend.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    /// Ground layer of the tile at `tile`, top-left corner at `dest`.
    Ground { tile: Position, dest: IVec2, scale: f32 },
    /// Everything stacked on the ground (items, creatures).
    Surface { tile: Position, dest: IVec2, scale: f32 },
    /// Effects of the tile, drawn over every surface of its floor.
    Effects { tile: Position, dest: IVec2, scale: f32 },
    Missile { id: ThingId, dest: IVec2, scale: f32 },
    FilledRect { rect: Rect, color: Rgba, opacity: f32 },
    TexturedRect { rect: Rect, texture: TextureId },
    /// Names / bars of one creature, in destination-rect space.
    CreatureInfo {
        creature: CreatureId,
        /// Destination rect the overlay is clipped to.
        clip: Rect,
        /// Framebuffer position of the creature's tile.
        dest: IVec2,
        scale: f32,
        draw_offset: IVec2,
        stretch: Vec2,
        gray: bool,
        flags: InfoFlags,
    },
    /// The assembled light map for this frame.
    LightMap {
        dest: Rect,
        src: Rect,
        ambient: Light,
        tile_size: i32,
        shades: Vec<Shade>,
    },
    Text {
        kind: TextKind,
        id: ThingId,
        point: IVec2,
        clip: Rect,
    },
}

/// A drawing backend.
///
/// The compositor drives it strictly in this order per pool:
/// `use_pool` → state changes / `draw` … → `flush`.
pub trait DrawPool {
    /// Start recording into `pool`.
    ///
    /// For [`PoolType::Map`] the backend samples `src` out of its offscreen
    /// buffer (cleared to black) into `dest`; other pools draw straight in
    /// destination space and get empty rects.
    fn use_pool(&mut self, pool: PoolType, dest: Rect, src: Rect);

    fn set_opacity(&mut self, opacity: f32);
    fn reset_opacity(&mut self);

    fn bind_shader(&mut self, shader: ShaderId, uniforms: &ShaderUniforms);
    fn reset_shader(&mut self);

    fn draw(&mut self, call: DrawCall);

    /// Commit what was drawn since the last flush as one layer.
    fn flush(&mut self);

    /// Resize the offscreen buffer of `pool`.
    fn resize(&mut self, pool: PoolType, size: IVec2);
    fn set_smooth(&mut self, pool: PoolType, smooth: bool);
    fn set_enabled(&mut self, pool: PoolType, enabled: bool);

    /*──────────── capabilities (graphics / texture manager) ────────────*/

    fn max_texture_size(&self) -> i32;
    fn has_shaders(&self) -> bool;
    fn texture(&mut self, path: &str) -> Option<TextureId>;
    fn default_map_shader(&self) -> Option<ShaderId>;
}

mod recording;
pub mod software;

pub use recording::{PoolEvent, RecordingPool};
pub use software::Software;
