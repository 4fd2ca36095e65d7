use glam::{IVec2, Vec2, ivec2};

use crate::defs::SPRITE_SIZE;
use crate::world::{Position, Rect, scale_keep_aspect};

/// Extra tiles drawn around the visible window so scrolling never shows a
/// gap.
pub const DRAW_MARGIN: i32 = 3;

/// Tile-window geometry and the world → framebuffer mapping.
///
/// ```text
/// draw          = visible + DRAW_MARGIN
/// tile_size     = SPRITE_SIZE * scale
/// center_offset = draw / 2 - 1
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    visible: IVec2,
    draw: IVec2,
    tile_size: i32,
    scale: f32,
    center_offset: IVec2,
}

impl Projection {
    pub fn new(visible: IVec2, scale: f32) -> Self {
        let draw = visible + IVec2::splat(DRAW_MARGIN);
        Self {
            visible,
            draw,
            tile_size: (SPRITE_SIZE as f32 * scale) as i32,
            scale,
            center_offset: draw / 2 - IVec2::ONE,
        }
    }

    #[inline]
    pub fn visible(&self) -> IVec2 {
        self.visible
    }

    #[inline]
    pub fn draw(&self) -> IVec2 {
        self.draw
    }

    #[inline]
    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Grid cell of the camera inside the draw window.
    #[inline]
    pub fn center_offset(&self) -> IVec2 {
        self.center_offset
    }

    /// Pixel size of the offscreen map buffer.
    #[inline]
    pub fn buffer_size(&self) -> IVec2 {
        self.draw * self.tile_size
    }

    /// Top-left framebuffer pixel of `pos` as seen from `camera`.
    ///
    /// Each floor above the camera is shifted one tile up-left.
    #[inline]
    pub fn transform(&self, pos: Position, camera: Position) -> IVec2 {
        let dz = camera.z - pos.z;
        ivec2(
            self.center_offset.x + (pos.x - camera.x) - dz,
            self.center_offset.y + (pos.y - camera.y) - dz,
        ) * self.tile_size
    }

    /// Part of the map buffer sampled into a destination of `dest_size`.
    ///
    /// `pan` is the sub-tile offset (walk or manual pan) at scale 1.
    pub fn framebuffer_source(&self, dest_size: IVec2, pan: IVec2) -> Rect {
        let mut offset = ((self.draw - self.visible - IVec2::ONE) / 2) * self.tile_size;
        offset += (pan.as_vec2() * self.scale).as_ivec2();

        let src_visible = self.visible * self.tile_size;
        let src_size = scale_keep_aspect(dest_size, src_visible);
        offset += (src_visible - src_size) / 2;

        Rect {
            origin: offset,
            size: src_size,
        }
    }

    /// Tile offset from the camera under the destination pixel `point`.
    pub fn tile_offset_at(&self, point: IVec2, dest_size: IVec2, pan: IVec2) -> IVec2 {
        let src = self.framebuffer_source(dest_size, pan);
        let stretch = Vec2::new(
            src.width() as f32 / dest_size.x as f32,
            src.height() as f32 / dest_size.y as f32,
        );
        let fb = (point.as_vec2() * stretch).as_ivec2();
        let cell = (fb + src.top_left()) / self.tile_size;
        self.center_offset - self.draw + cell + IVec2::splat(2)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
