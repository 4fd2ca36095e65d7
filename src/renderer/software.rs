//! ---------------------------------------------------------------------------
//! Flat-shaded software (CPU) draw pool
//!
//! * Fills an `&mut [u32]` frame-buffer in **0xAARRGGBB** format.
//! * The map pool renders into an offscreen buffer of the size requested by
//!   [`DrawPool::resize`]; when the pool is left, the `src` window of that
//!   buffer is scaled (nearest neighbour) into `dest` on the frame.
//! * Tiles have no sprites here: grounds are coloured by floor, surfaces are
//!   an inset square, overlays are simple bars and markers.
//! ---------------------------------------------------------------------------

use glam::IVec2;

use crate::defs::{FLOOR_COUNT, SPRITE_SIZE};
use crate::renderer::{DrawCall, DrawPool, PoolType, Rgba, ShaderId, ShaderUniforms, TextureId};
use crate::world::Rect;

/// Ground colour per floor, sky-most first.
const FLOOR_PALETTE: [Rgba; FLOOR_COUNT] = [
    0xFF_B0C4DE, 0xFF_A8BCD6, 0xFF_A0B4CE, 0xFF_98ACC6, 0xFF_90A4BE, 0xFF_889CB6, 0xFF_8094AE,
    0xFF_4F7942, 0xFF_6B5B45, 0xFF_5E4F3C, 0xFF_514333, 0xFF_45382A, 0xFF_3A2F23, 0xFF_30271D,
    0xFF_272018, 0xFF_1F1A14,
];
const SURFACE_COLOR: Rgba = 0xFF_8B5A2B;
const EFFECT_COLOR: Rgba = 0xFF_FFD700;
const MISSILE_COLOR: Rgba = 0xFF_FF4500;
const BAR_COLOR: Rgba = 0xFF_00C000;
const GRAY_BAR_COLOR: Rgba = 0xFF_808080;
const TEXT_COLOR: Rgba = 0xFF_FFFFFF;
const CROSSHAIR_COLOR: Rgba = 0xFF_FFFFFF;

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

#[derive(Default)]
pub struct Software {
    frame: Vec<Rgba>,
    width: usize,
    height: usize,

    /* offscreen map buffer */
    map: Vec<Rgba>,
    map_size: IVec2,
    map_dest: Rect,
    map_src: Rect,

    current: Option<PoolType>,
    opacity: f32,
    light_enabled: bool,
    textures: Vec<String>,
}

impl Software {
    pub fn new() -> Self {
        Self {
            opacity: 1.0,
            light_enabled: true,
            ..Self::default()
        }
    }

    /// (Re)allocate the frame for the requested resolution and clear it.
    pub fn begin_frame(&mut self, w: usize, h: usize) {
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.frame.resize(w * h, 0);
        }
        self.frame.fill(0xFF_000000);
        self.current = None;
        self.opacity = 1.0;
    }

    /// Finish the frame and **loan** it to `submit`.
    pub fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        self.leave_pool();
        submit(&self.frame, self.width, self.height);
    }

    /// Composite the map buffer when the map pool is left.
    fn leave_pool(&mut self) {
        if self.current == Some(PoolType::Map) {
            self.blit_map();
        }
        self.current = None;
    }

    fn blit_map(&mut self) {
        let (dest, src) = (self.map_dest, self.map_src);
        if dest.is_empty() || src.is_empty() {
            return;
        }
        for dy in 0..dest.height() {
            let fy = dest.origin.y + dy;
            if fy < 0 || fy >= self.height as i32 {
                continue;
            }
            let sy = src.origin.y + dy * src.height() / dest.height();
            for dx in 0..dest.width() {
                let fx = dest.origin.x + dx;
                if fx < 0 || fx >= self.width as i32 {
                    continue;
                }
                let sx = src.origin.x + dx * src.width() / dest.width();
                if sx < 0 || sy < 0 || sx >= self.map_size.x || sy >= self.map_size.y {
                    continue;
                }
                let px = self.map[(sy * self.map_size.x + sx) as usize];
                self.frame[fy as usize * self.width + fx as usize] = px;
            }
        }
    }

    /*──────────────────────── rasterising ────────────────────────*/

    fn fill(&mut self, rect: Rect, color: Rgba, opacity: f32) {
        let opacity = (opacity * self.opacity).clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        let (buf, w, h) = if self.current == Some(PoolType::Map) {
            (
                &mut self.map,
                self.map_size.x as usize,
                self.map_size.y as usize,
            )
        } else {
            (&mut self.frame, self.width, self.height)
        };
        let x0 = (rect.origin.x.max(0) as usize).min(w);
        let y0 = (rect.origin.y.max(0) as usize).min(h);
        let x1 = ((rect.origin.x + rect.size.x).max(0) as usize).min(w);
        let y1 = ((rect.origin.y + rect.size.y).max(0) as usize).min(h);
        // fully off the buffer
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for y in y0..y1 {
            for px in &mut buf[y * w + x0..y * w + x1] {
                *px = blend(*px, color, opacity);
            }
        }
    }

    fn tile_rect(dest: IVec2, scale: f32, inset: i32) -> Rect {
        let size = (SPRITE_SIZE as f32 * scale) as i32;
        Rect {
            origin: dest + IVec2::splat(inset),
            size: IVec2::splat((size - 2 * inset).max(1)),
        }
    }
}

/// Linear blend of `src` over `dst`.
fn blend(dst: Rgba, src: Rgba, a: f32) -> Rgba {
    let mix = |shift: u32| {
        let d = ((dst >> shift) & 0xFF) as f32;
        let s = ((src >> shift) & 0xFF) as f32;
        ((d + (s - d) * a).round() as u32) << shift
    };
    0xFF_000000 | mix(16) | mix(8) | mix(0)
}

/// Darken `px` to `factor` of its brightness.
fn darken(px: Rgba, factor: f32) -> Rgba {
    blend(px, 0xFF_000000, 1.0 - factor.clamp(0.0, 1.0))
}

/*──────────────────────── DrawPool trait impl ────────────────────────*/
impl DrawPool for Software {
    fn use_pool(&mut self, pool: PoolType, dest: Rect, src: Rect) {
        self.leave_pool();
        self.current = Some(pool);
        self.opacity = 1.0;
        if pool == PoolType::Map {
            self.map_dest = dest;
            self.map_src = src;
            self.map.fill(0xFF_000000);
        }
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    fn reset_opacity(&mut self) {
        self.opacity = 1.0;
    }

    // No shader support on the CPU path.
    fn bind_shader(&mut self, _shader: ShaderId, _uniforms: &ShaderUniforms) {}

    fn reset_shader(&mut self) {}

    fn draw(&mut self, call: DrawCall) {
        match call {
            DrawCall::Ground { tile, dest, scale } => {
                let color = FLOOR_PALETTE[tile.floor() as usize];
                let color = if (tile.x + tile.y) & 1 == 0 {
                    color
                } else {
                    darken(color, 0.92)
                };
                self.fill(Self::tile_rect(dest, scale, 0), color, 1.0);
            }
            DrawCall::Surface { dest, scale, .. } => {
                self.fill(Self::tile_rect(dest, scale, 6), SURFACE_COLOR, 1.0);
            }
            DrawCall::Effects { dest, scale, .. } => {
                self.fill(Self::tile_rect(dest, scale, 12), EFFECT_COLOR, 1.0);
            }
            DrawCall::Missile { dest, scale, .. } => {
                self.fill(Self::tile_rect(dest, scale, 13), MISSILE_COLOR, 1.0);
            }
            DrawCall::FilledRect {
                rect,
                color,
                opacity,
            } => self.fill(rect, color, opacity),
            DrawCall::TexturedRect { rect, .. } => {
                let (o, s) = (rect.origin, rect.size);
                self.fill(Rect::new(o.x, o.y, s.x, 1), CROSSHAIR_COLOR, 1.0);
                self.fill(Rect::new(o.x, o.y + s.y - 1, s.x, 1), CROSSHAIR_COLOR, 1.0);
                self.fill(Rect::new(o.x, o.y, 1, s.y), CROSSHAIR_COLOR, 1.0);
                self.fill(Rect::new(o.x + s.x - 1, o.y, 1, s.y), CROSSHAIR_COLOR, 1.0);
            }
            DrawCall::CreatureInfo {
                clip,
                dest,
                draw_offset,
                stretch,
                gray,
                ..
            } => {
                let p = (dest - draw_offset).as_vec2() * stretch;
                let p = p.as_ivec2() + clip.origin;
                let color = if gray { GRAY_BAR_COLOR } else { BAR_COLOR };
                self.fill(Rect::new(p.x, p.y - 6, 27, 4), color, 1.0);
            }
            DrawCall::LightMap {
                dest,
                src,
                ambient,
                tile_size,
                shades,
            } => {
                if !self.light_enabled || src.is_empty() {
                    return;
                }
                let darkness = 1.0 - ambient.intensity as f32 / 255.0;
                self.fill(dest, 0xFF_000000, darkness);

                // shades are in map-buffer pixels
                let stretch = dest.size.as_vec2() / src.size.as_vec2();
                let size = (IVec2::splat(tile_size).as_vec2() * stretch).as_ivec2();
                for shade in shades {
                    let at = ((shade.dest - src.origin).as_vec2() * stretch).as_ivec2();
                    let r = Rect {
                        origin: dest.origin + at,
                        size,
                    };
                    self.fill(r, 0xFF_000000, 0.25 * shade.opacity);
                }
            }
            DrawCall::Text { point, .. } => {
                self.fill(Rect::new(point.x - 2, point.y - 2, 4, 4), TEXT_COLOR, 1.0);
            }
        }
    }

    fn flush(&mut self) {}

    fn resize(&mut self, pool: PoolType, size: IVec2) {
        if pool == PoolType::Map {
            self.map_size = size;
            self.map.resize((size.x.max(0) * size.y.max(0)) as usize, 0xFF_000000);
        }
    }

    fn set_smooth(&mut self, _pool: PoolType, _smooth: bool) {}

    fn set_enabled(&mut self, pool: PoolType, enabled: bool) {
        if pool == PoolType::Light {
            self.light_enabled = enabled;
        }
    }

    fn max_texture_size(&self) -> i32 {
        4096
    }

    fn has_shaders(&self) -> bool {
        false
    }

    fn texture(&mut self, path: &str) -> Option<TextureId> {
        let idx = match self.textures.iter().position(|t| t == path) {
            Some(i) => i,
            None => {
                self.textures.push(path.to_owned());
                self.textures.len() - 1
            }
        };
        Some(idx as TextureId)
    }

    fn default_map_shader(&self) -> Option<ShaderId> {
        None
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
