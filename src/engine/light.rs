use glam::IVec2;

use crate::defs::DARK_THRESHOLD;
use crate::renderer::{DrawCall, DrawPool, PoolType, Shade};
use crate::world::{Light, Rect};

/// Light layer of the map view.
///
/// Holds the ambient light and the shades collected while the floors are
/// drawn; [`LightView::draw`] hands both to the backend as one
/// [`DrawCall::LightMap`] and starts the next frame empty.
#[derive(Clone, Debug)]
pub struct LightView {
    ambient: Light,
    shades: Vec<Shade>,
    draw: IVec2,
    tile_size: i32,
    smooth: bool,
}

impl LightView {
    pub fn new(draw: IVec2, tile_size: i32) -> Self {
        Self {
            ambient: Light::default(),
            shades: Vec::new(),
            draw,
            tile_size,
            smooth: true,
        }
    }

    pub fn resize(&mut self, draw: IVec2, tile_size: i32) {
        self.draw = draw;
        self.tile_size = tile_size;
        self.shades.clear();
    }

    #[inline]
    pub fn draw_dimension(&self) -> IVec2 {
        self.draw
    }

    #[inline]
    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn set_smooth(&mut self, smooth: bool) {
        self.smooth = smooth;
    }

    #[inline]
    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    pub fn set_global_light(&mut self, light: Light) {
        self.ambient = light;
    }

    #[inline]
    pub fn global_light(&self) -> Light {
        self.ambient
    }

    /// Dark enough for shades to show.
    #[inline]
    pub fn is_dark(&self) -> bool {
        self.ambient.intensity < DARK_THRESHOLD
    }

    pub fn add_shade(&mut self, dest: IVec2, opacity: f32) {
        if !self.is_dark() {
            return;
        }
        self.shades.push(Shade { dest, opacity });
    }

    #[inline]
    pub fn shades(&self) -> &[Shade] {
        &self.shades
    }

    /// Emit the light map sampled from `src` into `dest`.
    pub fn draw<P: DrawPool>(&mut self, pool: &mut P, dest: Rect, src: Rect) {
        pool.use_pool(PoolType::Light, dest, src);
        pool.draw(DrawCall::LightMap {
            dest,
            src,
            ambient: self.ambient,
            tile_size: self.tile_size,
            shades: std::mem::take(&mut self.shades),
        });
        pool.flush();
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
