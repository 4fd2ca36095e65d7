use glam::{IVec2, Vec2};

use crate::world::Rect;

/// Destination-dependent values, recomputed only when the target rect
/// changes (or the view pans / resizes and clears `rect`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectCache {
    pub rect: Rect,
    pub src_rect: Rect,
    pub draw_offset: IVec2,
    /// Destination pixels per framebuffer pixel.
    pub stretch: Vec2,
}

impl RectCache {
    pub fn new(rect: Rect, src_rect: Rect) -> Self {
        Self {
            rect,
            src_rect,
            draw_offset: src_rect.top_left(),
            stretch: Vec2::new(
                rect.width() as f32 / src_rect.width().max(1) as f32,
                rect.height() as f32 / src_rect.height().max(1) as f32,
            ),
        }
    }

    /// Force a recompute on the next frame.
    #[inline]
    pub fn invalidate(&mut self) {
        self.rect = Rect::default();
    }

    /// Framebuffer point → destination-rect point.
    #[inline]
    pub fn to_dest(&self, fb: IVec2) -> IVec2 {
        ((fb - self.draw_offset).as_vec2() * self.stretch).as_ivec2() + self.rect.top_left()
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
