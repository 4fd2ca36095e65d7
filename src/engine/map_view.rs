//! ---------------------------------------------------------------------------
//! Map view facade
//!
//! * Owns the backend (`P: DrawPool`) and the time source (`C: Clock`).
//! * Never owns world data: every call that needs tiles or creatures takes
//!   a `&W: WorldQuery`.
//! * External changes only raise dirty flags; the visible-tile cache is
//!   rebuilt lazily at the top of the next [`MapView::draw`].
//! ---------------------------------------------------------------------------

use std::time::Duration;

use glam::IVec2;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::ViewConfig;
use crate::defs::{
    AntialiasingMode, FloorViewMode, MAX_Z, SEA_FLOOR, SPRITE_SIZE, TRANSPARENT_FLOOR_VIEW_RANGE,
};
use crate::engine::fade::FloorFader;
use crate::engine::floors;
use crate::engine::light::LightView;
use crate::engine::projection::Projection;
use crate::engine::shader::{ShaderFader, ShaderPhase};
use crate::engine::timer::Clock;
use crate::engine::types::RectCache;
use crate::engine::visibility::{RebuildParams, VisibleTiles};
use crate::renderer::{DrawPool, PoolType, ShaderId, TextureId};
use crate::world::{
    AwareRange, Camera, CreatureId, Direction, Light, Position, Rect, TileView, WorldQuery,
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    #[error("visible dimension must be odd, got {0}x{1}")]
    EvenDimension(i32, i32),
    #[error("visible dimension {0}x{1} is below the 3x3 minimum")]
    DimensionTooSmall(i32, i32),
    #[error("map buffer {width}x{height} exceeds the max texture size {max}")]
    TextureSizeExceeded { width: i32, height: i32, max: i32 },
}

pub struct MapView<P: DrawPool, C: Clock> {
    pub(super) pool: P,
    pub(super) clock: C,

    /* camera */
    camera: Camera,
    last_camera: Option<Position>,
    move_offset: IVec2,

    /* geometry */
    pub(super) projection: Projection,
    pub(super) rect_dimension: Rect,
    pub(super) rect_cache: RectCache,
    world_aware_range: AwareRange,
    aware_range: AwareRange,
    viewport_cache: [AwareRange; Direction::ALL.len()],
    pub(super) viewport: AwareRange,
    pub(super) draw_viewport_edge: bool,

    /* floors */
    pub(super) floor_view_mode: FloorViewMode,
    antialiasing: AntialiasingMode,
    locked_first_floor: Option<u8>,
    pub(super) cached_first: u8,
    cached_last: u8,
    pub(super) tiles: VisibleTiles,
    pub(super) fader: FloorFader,
    pub(super) shader: ShaderFader,

    /* light */
    pub(super) light: Option<LightView>,
    minimum_ambient_light: f32,
    pub(super) shadow_floor_intensity: f32,

    /* overlays */
    pub(super) draw_names: bool,
    pub(super) draw_health_bars: bool,
    pub(super) draw_mana_bar: bool,
    pub(super) draw_texts: bool,
    draw_highlight_target: bool,
    effects_on_top: bool,
    pub(super) crosshair: Option<TextureId>,

    /* mouse */
    pub(super) mouse_position: Option<Position>,
    pub(super) window_mouse: Option<IVec2>,
    pub(super) highlight: Option<Position>,
    shift_pressed: bool,

    /* dirty flags */
    pub(super) refresh_tiles: bool,
    refresh_creatures: bool,
}

impl<P: DrawPool, C: Clock> MapView<P, C> {
    /// Build a view over `pool` configured by `config`.
    ///
    /// Fails if the configured dimension is rejected; the world is only
    /// read for its aware range and ambient light.
    pub fn new<W: WorldQuery>(
        pool: P,
        clock: C,
        config: &ViewConfig,
        world: &W,
    ) -> Result<Self, ViewError> {
        let shader = ShaderFader::new(pool.default_map_shader());
        let mut view = Self {
            pool,
            clock,
            camera: Camera::default(),
            last_camera: None,
            move_offset: IVec2::ZERO,
            projection: Projection::new(IVec2::ZERO, config.antialiasing.scale_factor()),
            rect_dimension: Rect::default(),
            rect_cache: RectCache::default(),
            world_aware_range: world.aware_range(),
            aware_range: AwareRange::default(),
            viewport_cache: [AwareRange::default(); Direction::ALL.len()],
            viewport: AwareRange::default(),
            draw_viewport_edge: false,
            floor_view_mode: config.floor_view_mode,
            antialiasing: config.antialiasing,
            locked_first_floor: None,
            cached_first: SEA_FLOOR,
            cached_last: SEA_FLOOR,
            tiles: VisibleTiles::default(),
            fader: FloorFader::new(config.floor_fading()),
            shader,
            light: None,
            minimum_ambient_light: config.minimum_ambient_light,
            shadow_floor_intensity: config.shadow_floor_intensity,
            draw_names: config.draw_names,
            draw_health_bars: config.draw_health_bars,
            draw_mana_bar: config.draw_mana_bar,
            draw_texts: config.draw_texts,
            draw_highlight_target: config.draw_highlight_target,
            effects_on_top: config.effects_on_top,
            crosshair: None,
            mouse_position: None,
            window_mouse: None,
            highlight: None,
            shift_pressed: false,
            refresh_tiles: true,
            refresh_creatures: true,
        };

        view.pool
            .set_smooth(PoolType::Map, config.antialiasing.is_smooth());
        view.set_visible_dimension(config.visible())?;
        view.set_draw_lights(world, config.draw_lights);
        if let Some(path) = &config.crosshair {
            view.set_crosshair_texture(path);
        }
        Ok(view)
    }

    /*──────────────────────── geometry ────────────────────────*/

    /// Resize the tile window. Both sides must be odd and at least 3.
    pub fn set_visible_dimension(&mut self, visible: IVec2) -> Result<(), ViewError> {
        if visible == self.projection.visible() {
            return Ok(());
        }
        if visible.x.rem_euclid(2) != 1 || visible.y.rem_euclid(2) != 1 {
            let err = ViewError::EvenDimension(visible.x, visible.y);
            error!(%err, "visible dimension rejected");
            return Err(err);
        }
        if visible.x < 3 || visible.y < 3 {
            let err = ViewError::DimensionTooSmall(visible.x, visible.y);
            error!(%err, "reached max zoom in");
            return Err(err);
        }
        self.update_geometry(visible)
    }

    fn update_geometry(&mut self, visible: IVec2) -> Result<(), ViewError> {
        let projection = Projection::new(visible, self.antialiasing.scale_factor());
        let buffer = projection.buffer_size();
        let max = self.pool.max_texture_size();
        if buffer.x > max || buffer.y > max {
            let err = ViewError::TextureSizeExceeded {
                width: buffer.x,
                height: buffer.y,
                max,
            };
            error!(%err, "reached max zoom out");
            return Err(err);
        }

        self.projection = projection;
        self.rect_dimension = Rect::from_size(buffer);
        self.pool.resize(PoolType::Map, buffer);
        if let Some(light) = &mut self.light {
            light.resize(projection.draw(), projection.tile_size());
        }

        self.update_aware_range();
        self.rect_cache.invalidate();
        self.refresh_visible_tiles();
        self.refresh_visible_creatures();
        debug!(
            visible = ?visible,
            draw = ?projection.draw(),
            tile_size = projection.tile_size(),
            "map view geometry updated"
        );
        Ok(())
    }

    fn update_aware_range(&mut self) {
        let draw = self.projection.draw();
        let left = self.world_aware_range.left.min(draw.x / 2 - 1);
        let top = self.world_aware_range.top.min(draw.y / 2 - 1);
        self.aware_range = AwareRange::new(left, left + 1, top, top + 1);
        self.update_viewport_direction_cache();
        self.update_viewport(Direction::Invalid);
    }

    fn update_viewport_direction_cache(&mut self) {
        let a = self.aware_range;
        for dir in Direction::ALL {
            let mut vp = AwareRange::new(a.right, a.right, a.top, a.top);
            match dir {
                Direction::North | Direction::South => {
                    vp.top += 1;
                    vp.bottom += 1;
                }
                Direction::East | Direction::West => {
                    vp.left += 1;
                    vp.right += 1;
                }
                Direction::Invalid => {
                    vp.left -= 1;
                    vp.right -= 1;
                }
                _ => {
                    vp.left += 1;
                    vp.right += 1;
                    vp.top += 1;
                    vp.bottom += 1;
                }
            }
            self.viewport_cache[dir.index()] = vp;
        }
    }

    /// Select the viewport for a camera walking towards `dir`; the edge
    /// rows are only drawn while walking.
    fn update_viewport(&mut self, dir: Direction) {
        self.viewport = self.viewport_cache[dir.index()];
        self.draw_viewport_edge = dir != Direction::Invalid;
    }

    /*──────────────────────── settings ────────────────────────*/

    pub fn set_floor_view_mode(&mut self, mode: FloorViewMode) {
        self.floor_view_mode = mode;
        self.last_camera = None;
        self.refresh_visible_tiles();
    }

    /// Switch anti-aliasing. `SmoothRetro` doubles the tile size, which can
    /// exceed the backend's texture limit; the previous mode is then kept.
    pub fn set_antialiasing_mode(&mut self, mode: AntialiasingMode) -> Result<(), ViewError> {
        let previous = self.antialiasing;
        self.antialiasing = mode;
        if let Err(err) = self.update_geometry(self.projection.visible()) {
            self.antialiasing = previous;
            return Err(err);
        }
        self.pool.set_smooth(PoolType::Map, mode.is_smooth());
        if let Some(light) = &mut self.light {
            light.set_smooth(mode.is_smooth());
            self.pool.set_smooth(PoolType::Light, mode.is_smooth());
        }
        Ok(())
    }

    /// Change the map shader, fading the old one out first when
    /// `fade_out` is non-zero.
    pub fn set_shader<W: WorldQuery>(
        &mut self,
        world: &W,
        shader: Option<ShaderId>,
        fade_in: Duration,
        fade_out: Duration,
    ) {
        let camera = self.camera.position(world);
        let now = self.clock.now();
        self.shader.set(shader, fade_in, fade_out, camera, now);
    }

    pub fn set_draw_lights<W: WorldQuery>(&mut self, world: &W, enable: bool) {
        self.pool.set_enabled(PoolType::Light, enable);
        if enable == self.light.is_some() {
            return;
        }

        self.light = enable.then(|| {
            let mut light = LightView::new(self.projection.draw(), self.projection.tile_size());
            light.set_smooth(self.antialiasing.is_smooth());
            light
        });
        self.update_light(world);
        // shades are only collected while lights are drawn
        self.refresh_visible_tiles();
    }

    /// Texture drawn on the hovered tile; an empty path removes it.
    pub fn set_crosshair_texture(&mut self, path: &str) {
        self.crosshair = if path.is_empty() {
            None
        } else {
            let texture = self.pool.texture(path);
            if texture.is_none() {
                warn!(path, "crosshair texture not found");
            }
            texture
        };
    }

    pub fn set_floor_fading(&mut self, duration: Duration) {
        self.fader.set_duration(duration);
    }

    pub fn set_shadow_floor_intensity(&mut self, intensity: f32) {
        self.shadow_floor_intensity = intensity.clamp(0.0, 1.0);
    }

    pub fn set_minimum_ambient_light<W: WorldQuery>(&mut self, world: &W, intensity: f32) {
        self.minimum_ambient_light = intensity.clamp(0.0, 1.0);
        self.update_light(world);
    }

    pub fn set_draw_names(&mut self, enable: bool) {
        self.draw_names = enable;
    }

    pub fn set_draw_health_bars(&mut self, enable: bool) {
        self.draw_health_bars = enable;
    }

    pub fn set_draw_mana_bar(&mut self, enable: bool) {
        self.draw_mana_bar = enable;
    }

    pub fn set_draw_texts(&mut self, enable: bool) {
        self.draw_texts = enable;
    }

    pub fn set_draw_highlight_target(&mut self, enable: bool) {
        self.draw_highlight_target = enable;
        if !enable {
            self.highlight = None;
        }
    }

    pub fn set_effects_on_top(&mut self, enable: bool) {
        if self.effects_on_top != enable {
            self.effects_on_top = enable;
            self.refresh_visible_tiles();
        }
    }

    /*──────────────────────── camera ────────────────────────*/

    pub fn follow_creature(&mut self, creature: CreatureId) {
        self.camera.follow(creature);
        self.last_camera = None;
        self.refresh_visible_tiles();
    }

    pub fn set_camera_position(&mut self, pos: Position) {
        self.camera.set_fixed(pos);
        self.refresh_visible_tiles();
    }

    /// Pan the fixed camera by `dx, dy` pixels.
    ///
    /// Whole tiles move the camera; the remainder is kept as a sub-tile
    /// offset applied to the framebuffer source rect.
    pub fn move_by<W: WorldQuery>(&mut self, world: &W, dx: i32, dy: i32) {
        self.move_offset += IVec2::new(dx, dy);

        let tiles = self.move_offset / SPRITE_SIZE;
        let mut shifted = false;
        if tiles.x != 0 {
            self.camera.shift(tiles.x, 0);
            self.move_offset.x %= SPRITE_SIZE;
            shifted = true;
        }
        if tiles.y != 0 {
            self.camera.shift(0, tiles.y);
            self.move_offset.y %= SPRITE_SIZE;
            shifted = true;
        }

        self.rect_cache.invalidate();
        if shifted {
            self.refresh_visible_tiles();
        }
        self.on_camera_move(world);
    }

    /// Pin the first visible floor; takes precedence over the view mode.
    pub fn lock_first_visible_floor(&mut self, floor: u8) {
        self.locked_first_floor = Some(floor.min(MAX_Z));
        self.refresh_visible_tiles();
    }

    pub fn unlock_first_visible_floor(&mut self) {
        self.locked_first_floor = None;
        self.refresh_visible_tiles();
    }

    /*──────────────────────── events ────────────────────────*/

    pub fn refresh_visible_tiles(&mut self) {
        self.refresh_tiles = true;
    }

    pub fn refresh_visible_creatures(&mut self) {
        self.refresh_creatures = true;
    }

    /// Something on the tile at `pos` changed.
    pub fn on_tile_update(&mut self, _pos: Position, creature_changed: bool) {
        if creature_changed {
            self.refresh_visible_creatures();
        }
        self.refresh_visible_tiles();
    }

    pub fn on_map_center_change(&mut self) {
        self.refresh_visible_tiles();
    }

    pub fn on_global_light_change<W: WorldQuery>(&mut self, world: &W) {
        self.update_light(world);
    }

    /// The camera moved by less than a tile (walk step or pan).
    pub fn on_camera_move<W: WorldQuery>(&mut self, world: &W) {
        self.rect_cache.invalidate();
        if self.camera.is_following() {
            let dir = match self.camera.followed_state(world) {
                Some(state) if state.walking => state.direction,
                _ => Direction::Invalid,
            };
            self.update_viewport(dir);
        }
    }

    pub fn on_floor_change<W: WorldQuery>(&mut self, world: &W) {
        self.refresh_visible_creatures();
        self.update_light(world);
    }

    pub fn on_fade_in_finished(&mut self) {
        self.refresh_visible_tiles();
    }

    /// The world's default aware range changed.
    pub fn on_aware_range_change<W: WorldQuery>(&mut self, world: &W) {
        self.world_aware_range = world.aware_range();
        self.update_aware_range();
        self.refresh_visible_tiles();
        self.refresh_visible_creatures();
    }

    /// The mouse is over the tile at `pos`. `_virtual` is set when the
    /// camera moved under a still mouse.
    pub fn on_mouse_move<W: WorldQuery>(&mut self, world: &W, pos: Position, _virtual: bool) {
        self.mouse_position = Some(pos);
        self.highlight = None;
        if self.draw_highlight_target {
            self.highlight = if self.shift_pressed {
                self.get_top_tile(world, pos).map(TileView::position)
            } else {
                world.tile(pos).map(TileView::position)
            };
        }
    }

    /// Mouse position in window pixels; `None` once it leaves the window.
    pub fn on_window_mouse_move(&mut self, point: Option<IVec2>) {
        self.window_mouse = point;
    }

    pub fn set_shift_pressed<W: WorldQuery>(&mut self, world: &W, pressed: bool) {
        if pressed == self.shift_pressed {
            return;
        }
        self.shift_pressed = pressed;
        if let Some(pos) = self.mouse_position {
            self.on_mouse_move(world, pos, false);
        }
    }

    fn update_light<W: WorldQuery>(&mut self, world: &W) {
        let camera = self.camera.position(world);
        let Some(light) = &mut self.light else {
            return;
        };
        let mut ambient = match camera {
            Some(cam) if cam.z > SEA_FLOOR as i32 => Light::default(),
            _ => world.light(),
        };
        let floor = (self.minimum_ambient_light * 255.0) as u8;
        ambient.intensity = ambient.intensity.max(floor);
        light.set_global_light(ambient);
    }

    /*──────────────────────── rebuild ────────────────────────*/

    /// Lock in effect: the manual one, else the camera floor in locked mode.
    fn effective_lock(&self, cam: Position) -> Option<u8> {
        self.locked_first_floor.or_else(|| {
            (self.floor_view_mode == FloorViewMode::Locked).then(|| cam.floor())
        })
    }

    /// Refresh floor range, fade timers and the visible tile cache.
    ///
    /// Without a known camera nothing happens and the flags stay raised.
    pub(super) fn update_visible_tiles<W: WorldQuery>(&mut self, world: &W) {
        let Some(cam) = self.camera.position(world) else {
            return;
        };

        if self.last_camera != Some(cam) {
            self.follow_mouse(world, cam);
            if self.last_camera.is_none_or(|last| last.z != cam.z) {
                debug!(floor = cam.z, "camera floor changed");
                self.on_floor_change(world);
            }
        }

        let lock = self.effective_lock(cam);
        let prev_first = self.cached_first;
        let check_limits = self.floor_view_mode != FloorViewMode::Always;
        let (first, last) = floors::visible_floor_range(world, Some(cam), lock, check_limits);
        self.cached_first = first;
        self.cached_last = last;

        let walk_from = if self.floor_view_mode == FloorViewMode::AlwaysWithTransparency
            || self.is_fading()
        {
            floors::first_visible_floor(world, Some(cam), lock, false)
        } else {
            first
        };

        let now = self.clock.now();
        let jumped = FloorFader::is_jump(self.last_camera, cam);
        self.fader
            .on_range_change(jumped, prev_first, first, walk_from..=last, now);
        self.last_camera = Some(cam);

        let shades = self.is_drawing_lights();
        let sight = self.sight_range();
        self.tiles.rebuild(
            world,
            &RebuildParams {
                camera: cam,
                floors: walk_from..=last,
                draw: self.projection.draw(),
                center_offset: self.projection.center_offset(),
                shades,
                effects_on_top: self.effects_on_top,
                creatures: self.refresh_creatures.then_some(sight),
            },
        );
        debug_assert!(self.tiles.floor_min() as i32 <= cam.z && cam.z <= self.tiles.floor_max() as i32);

        self.refresh_tiles = false;
        self.refresh_creatures = false;
        debug!(first, last, walk_from, camera = %cam, "visible floors updated");
    }

    /// Keep the mouse over the same screen cell while the camera moves.
    fn follow_mouse<W: WorldQuery>(&mut self, world: &W, cam: Position) {
        let Some(mouse) = self.mouse_position else {
            return;
        };
        let dir = self
            .last_camera
            .map_or(Direction::Invalid, |last| last.direction_to(&cam));
        let mut moved = mouse.translated_to_direction(dir);
        if let Some(last) = self.last_camera {
            if cam.z != last.z {
                moved.z += cam.z - last.z;
                moved = moved.translated_to_direction(dir);
            }
        }
        self.on_mouse_move(world, moved, true);
    }

    /*──────────────────────── queries ────────────────────────*/

    #[inline]
    pub fn camera_position<W: WorldQuery>(&self, world: &W) -> Option<Position> {
        self.camera.position(world)
    }

    #[inline]
    pub fn is_following_creature(&self) -> bool {
        self.camera.is_following()
    }

    #[inline]
    pub fn followed_creature(&self) -> Option<CreatureId> {
        self.camera.followed()
    }

    /// Sub-tile offset of the source rect: the followed creature's walk
    /// offset, else the manual pan.
    pub(super) fn pan<W: WorldQuery>(&self, world: &W) -> IVec2 {
        if self.camera.is_following() {
            self.camera
                .followed_state(world)
                .map_or(IVec2::ZERO, |s| s.walk_offset)
        } else {
            self.move_offset
        }
    }

    /// World position under `point` of a map widget of `map_size` pixels.
    pub fn get_position<W: WorldQuery>(
        &self,
        world: &W,
        point: IVec2,
        map_size: IVec2,
    ) -> Option<Position> {
        let cam = self.camera.position(world)?;
        if map_size.x <= 0 || map_size.y <= 0 {
            return None;
        }
        let offset = self
            .projection
            .tile_offset_at(point, map_size, self.pan(world));
        let pos = cam.translated(offset.x, offset.y);
        pos.is_valid().then_some(pos)
    }

    /// Top-most clickable tile drawn over the screen cell of `pos`.
    pub fn get_top_tile<'w, W: WorldQuery>(&self, world: &'w W, pos: Position) -> Option<&'w W::Tile> {
        let range = TRANSPARENT_FLOOR_VIEW_RANGE;
        if self.floor_view_mode == FloorViewMode::AlwaysWithTransparency
            && self
                .last_camera
                .is_some_and(|cam| pos.is_in_range(&cam, range, range, false))
        {
            return world.tile(pos);
        }

        let mut p = pos;
        p.covered_up(pos.z - self.cached_first as i32);
        for _ in self.cached_first..=self.tiles.floor_max() {
            if let Some(tile) = world.tile(p).filter(|t| t.is_clickable()) {
                return Some(tile);
            }
            p.covered_down(1);
        }
        None
    }

    /// Range in which creatures are actually visible.
    #[inline]
    fn sight_range(&self) -> AwareRange {
        self.aware_range.shrunk(1, 2, 1, 2)
    }

    pub fn get_sight_spectators<W: WorldQuery>(
        &self,
        world: &W,
        center: Position,
        multi_floor: bool,
    ) -> Vec<CreatureId> {
        world.spectators_in_range(center, multi_floor, self.sight_range())
    }

    pub fn get_spectators<W: WorldQuery>(
        &self,
        world: &W,
        center: Position,
        multi_floor: bool,
    ) -> Vec<CreatureId> {
        world.spectators_in_range(center, multi_floor, self.aware_range)
    }

    /// Is `pos` inside the sight range of the camera?
    pub fn is_in_range<W: WorldQuery>(&self, world: &W, pos: Position, ignore_z: bool) -> bool {
        let r = self.sight_range();
        self.camera
            .position(world)
            .is_some_and(|cam| cam.is_in_range_ex(&pos, r.left, r.right, r.top, r.bottom, ignore_z))
    }

    /// Is `pos` inside the full aware range of the camera?
    pub fn is_in_range_ex<W: WorldQuery>(&self, world: &W, pos: Position, ignore_z: bool) -> bool {
        let r = self.aware_range;
        self.camera
            .position(world)
            .is_some_and(|cam| cam.is_in_range_ex(&pos, r.left, r.right, r.top, r.bottom, ignore_z))
    }

    #[inline]
    pub fn visible_dimension(&self) -> IVec2 {
        self.projection.visible()
    }

    #[inline]
    pub fn draw_dimension(&self) -> IVec2 {
        self.projection.draw()
    }

    #[inline]
    pub fn tile_size(&self) -> i32 {
        self.projection.tile_size()
    }

    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.projection.scale()
    }

    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    #[inline]
    pub fn aware_range(&self) -> AwareRange {
        self.aware_range
    }

    #[inline]
    pub fn viewport(&self) -> (AwareRange, bool) {
        (self.viewport, self.draw_viewport_edge)
    }

    #[inline]
    pub fn floor_view_mode(&self) -> FloorViewMode {
        self.floor_view_mode
    }

    #[inline]
    pub fn antialiasing_mode(&self) -> AntialiasingMode {
        self.antialiasing
    }

    #[inline]
    pub fn locked_first_visible_floor(&self) -> Option<u8> {
        self.locked_first_floor
    }

    #[inline]
    pub fn first_visible_floor(&self) -> u8 {
        self.cached_first
    }

    #[inline]
    pub fn last_visible_floor(&self) -> u8 {
        self.cached_last
    }

    #[inline]
    pub fn floor_min(&self) -> u8 {
        self.tiles.floor_min()
    }

    #[inline]
    pub fn floor_max(&self) -> u8 {
        self.tiles.floor_max()
    }

    #[inline]
    pub fn visible_tiles(&self) -> &VisibleTiles {
        &self.tiles
    }

    #[inline]
    pub fn visible_creatures(&self) -> &[CreatureId] {
        self.tiles.creatures()
    }

    #[inline]
    pub fn move_offset(&self) -> IVec2 {
        self.move_offset
    }

    #[inline]
    pub fn mouse_position(&self) -> Option<Position> {
        self.mouse_position
    }

    #[inline]
    pub fn highlighted_tile(&self) -> Option<Position> {
        self.highlight
    }

    #[inline]
    pub fn is_drawing_names(&self) -> bool {
        self.draw_names
    }

    #[inline]
    pub fn is_drawing_health_bars(&self) -> bool {
        self.draw_health_bars
    }

    #[inline]
    pub fn is_drawing_mana_bar(&self) -> bool {
        self.draw_mana_bar
    }

    #[inline]
    pub fn is_drawing_texts(&self) -> bool {
        self.draw_texts
    }

    #[inline]
    pub fn needs_refresh(&self) -> bool {
        self.refresh_tiles
    }

    /// Floors cross-fade only in [`FloorViewMode::Fade`] with a duration.
    #[inline]
    pub fn is_fading(&self) -> bool {
        self.floor_view_mode == FloorViewMode::Fade && !self.fader.duration().is_zero()
    }

    pub fn fade_level(&self, z: u8) -> f32 {
        self.fader.level(z, self.cached_first, self.clock.now())
    }

    #[inline]
    pub fn is_drawing_lights(&self) -> bool {
        self.light.as_ref().is_some_and(LightView::is_dark)
    }

    #[inline]
    pub fn light_view(&self) -> Option<&LightView> {
        self.light.as_ref()
    }

    pub fn shader_phase(&self) -> ShaderPhase {
        self.shader.phase(self.clock.now())
    }

    #[inline]
    pub fn current_shader(&self) -> Option<ShaderId> {
        self.shader.current()
    }

    #[inline]
    pub fn pool(&self) -> &P {
        &self.pool
    }

    #[inline]
    pub fn pool_mut(&mut self) -> &mut P {
        &mut self.pool
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::TileFlags;
    use crate::engine::timer::ManualClock;
    use crate::renderer::{PoolEvent, RecordingPool};
    use crate::world::GridWorld;
    use glam::ivec2;
    use proptest::prelude::*;

    type View = MapView<RecordingPool, ManualClock>;

    fn world_at(z: i32) -> (GridWorld, Position) {
        let mut w = GridWorld::new();
        w.fill(z, ivec2(80, 80), ivec2(120, 120), TileFlags::GROUND);
        (w, Position::new(100, 100, z))
    }

    fn view_over(world: &GridWorld, cam: Position, config: &ViewConfig) -> View {
        let mut view =
            MapView::new(RecordingPool::new(), ManualClock::new(), config, world).unwrap();
        view.set_camera_position(cam);
        view
    }

    fn rebuilt(world: &GridWorld, cam: Position) -> View {
        let mut view = view_over(world, cam, &ViewConfig::default());
        view.update_visible_tiles(world);
        view
    }

    #[test]
    fn default_geometry() {
        let w = GridWorld::new();
        let view = view_over(&w, Position::new(100, 100, 7), &ViewConfig::default());
        assert_eq!(view.visible_dimension(), ivec2(15, 11));
        assert_eq!(view.draw_dimension(), ivec2(18, 14));
        assert_eq!(view.tile_size(), 32);
        assert_eq!(view.aware_range(), AwareRange::new(8, 9, 6, 7));
        assert_eq!(view.viewport(), (AwareRange::new(8, 8, 6, 6), false));
        assert!(view.pool().events.contains(&PoolEvent::Resize {
            pool: PoolType::Map,
            size: ivec2(576, 448),
        }));
    }

    #[test]
    fn viewport_grows_towards_the_walk_direction() {
        let mut w = GridWorld::new();
        let id = w.add_creature(Position::new(100, 100, 7));
        let mut view = view_over(&w, Position::new(100, 100, 7), &ViewConfig::default());
        view.follow_creature(id);

        let state = w.creature_mut(id).unwrap();
        state.walking = true;
        state.direction = Direction::North;
        view.on_camera_move(&w);
        assert_eq!(view.viewport(), (AwareRange::new(9, 9, 7, 7), true));

        w.creature_mut(id).unwrap().direction = Direction::SouthWest;
        view.on_camera_move(&w);
        assert_eq!(view.viewport(), (AwareRange::new(10, 10, 7, 7), true));

        w.creature_mut(id).unwrap().walking = false;
        view.on_camera_move(&w);
        assert_eq!(view.viewport(), (AwareRange::new(8, 8, 6, 6), false));
    }

    #[test]
    fn rejected_dimensions_leave_state_untouched() {
        let w = GridWorld::new();
        let mut view = view_over(&w, Position::new(100, 100, 7), &ViewConfig::default());

        assert_eq!(
            view.set_visible_dimension(ivec2(16, 11)),
            Err(ViewError::EvenDimension(16, 11))
        );
        assert_eq!(
            view.set_visible_dimension(ivec2(1, 11)),
            Err(ViewError::DimensionTooSmall(1, 11))
        );
        assert_eq!(view.visible_dimension(), ivec2(15, 11));

        // same dimension is a no-op
        view.pool_mut().clear();
        assert_eq!(view.set_visible_dimension(ivec2(15, 11)), Ok(()));
        assert!(view.pool().events.is_empty());

        view.pool_mut().max_texture_size = 600;
        assert_eq!(
            view.set_visible_dimension(ivec2(21, 15)),
            Err(ViewError::TextureSizeExceeded {
                width: 768,
                height: 576,
                max: 600
            })
        );
        assert_eq!(view.draw_dimension(), ivec2(18, 14));
    }

    #[test]
    fn aware_range_shrinks_with_small_windows() {
        let w = GridWorld::new();
        let mut view = view_over(&w, Position::new(100, 100, 7), &ViewConfig::default());
        view.set_visible_dimension(ivec2(5, 3)).unwrap();
        // draw 8x6 → left = 3, top = 2
        assert_eq!(view.aware_range(), AwareRange::new(3, 4, 2, 3));
    }

    #[test]
    fn smooth_retro_doubles_tiles_or_is_reverted() {
        let w = GridWorld::new();
        let mut view = view_over(&w, Position::new(100, 100, 7), &ViewConfig::default());
        view.set_antialiasing_mode(AntialiasingMode::SmoothRetro).unwrap();
        assert_eq!(view.tile_size(), 64);
        assert!(view.pool().events.contains(&PoolEvent::Smooth {
            pool: PoolType::Map,
            smooth: true,
        }));

        view.set_antialiasing_mode(AntialiasingMode::Disabled).unwrap();
        view.pool_mut().max_texture_size = 1000;
        assert!(view.set_antialiasing_mode(AntialiasingMode::SmoothRetro).is_err());
        assert_eq!(view.antialiasing_mode(), AntialiasingMode::Disabled);
        assert_eq!(view.tile_size(), 32);
    }

    #[test]
    fn surface_floor_range() {
        let (w, cam) = world_at(7);
        let view = rebuilt(&w, cam);
        assert_eq!((view.first_visible_floor(), view.last_visible_floor()), (0, 7));
        assert_eq!((view.floor_min(), view.floor_max()), (7, 7));
        assert!(!view.needs_refresh());
    }

    #[test]
    fn underground_floor_range() {
        let (w, cam) = world_at(10);
        let view = rebuilt(&w, cam);
        assert_eq!((view.first_visible_floor(), view.last_visible_floor()), (8, 12));
    }

    #[test]
    fn locks() {
        let (w, cam) = world_at(7);
        let mut view = rebuilt(&w, cam);
        view.lock_first_visible_floor(5);
        assert!(view.needs_refresh());
        view.update_visible_tiles(&w);
        assert_eq!(view.first_visible_floor(), 5);

        view.unlock_first_visible_floor();
        view.set_floor_view_mode(FloorViewMode::Locked);
        view.update_visible_tiles(&w);
        assert_eq!(view.first_visible_floor(), 7);

        // manual lock wins over the locked mode
        view.lock_first_visible_floor(3);
        view.update_visible_tiles(&w);
        assert_eq!(view.first_visible_floor(), 3);
    }

    #[test]
    fn unknown_camera_keeps_the_cache_dirty() {
        let w = GridWorld::new();
        let mut view = view_over(&w, Position::new(100, 100, 7), &ViewConfig::default());
        view.follow_creature(77);
        view.update_visible_tiles(&w);
        assert!(view.needs_refresh());
        assert_eq!(view.camera_position(&w), None);
        assert!(!view.is_in_range(&w, Position::new(100, 100, 7), false));
    }

    #[test]
    fn pan_moves_whole_tiles_and_keeps_the_rest() {
        let (w, cam) = world_at(7);
        let mut view = rebuilt(&w, cam);

        view.move_by(&w, 32, 0);
        assert_eq!(view.camera_position(&w), Some(cam.translated(1, 0)));
        assert_eq!(view.move_offset(), IVec2::ZERO);
        assert!(view.needs_refresh());

        view.update_visible_tiles(&w);
        view.move_by(&w, 10, 0);
        assert_eq!(view.camera_position(&w), Some(cam.translated(1, 0)));
        assert_eq!(view.move_offset(), ivec2(10, 0));
        assert!(!view.needs_refresh());

        view.move_by(&w, -50, -70);
        // x: 10 - 50 = -40 → -1 tile, -8 left; y: -70 → -2 tiles, -6 left
        assert_eq!(view.camera_position(&w), Some(cam.translated(0, -2)));
        assert_eq!(view.move_offset(), ivec2(-8, -6));
    }

    #[test]
    fn screen_point_to_world_position() {
        let (w, cam) = world_at(7);
        let view = rebuilt(&w, cam);
        let size = ivec2(480, 352);
        assert_eq!(view.get_position(&w, size / 2, size), Some(cam));
        assert_eq!(view.get_position(&w, ivec2(0, 0), size), Some(cam.translated(-7, -5)));
        assert_eq!(view.get_position(&w, ivec2(479, 351), size), Some(cam.translated(7, 5)));
        assert_eq!(view.get_position(&w, ivec2(0, 0), IVec2::ZERO), None);
    }

    #[test]
    fn spectators_and_ranges() {
        let (mut w, cam) = world_at(7);
        let near = w.add_creature(cam.translated(7, 5));
        let edge = w.add_creature(cam.translated(9, 7));
        w.add_creature(cam.translated(10, 0));
        let view = rebuilt(&w, cam);

        assert_eq!(view.get_sight_spectators(&w, cam, false), vec![near]);
        assert_eq!(view.get_spectators(&w, cam, false), vec![near, edge]);

        assert!(view.is_in_range(&w, cam.translated(-7, -5), false));
        assert!(!view.is_in_range(&w, cam.translated(-8, 0), false));
        assert!(!view.is_in_range(&w, cam.translated(0, 0).translated_z(0, 0, -1), false));
        assert!(view.is_in_range(&w, cam.translated_z(0, 0, -1), true));
        assert!(view.is_in_range_ex(&w, cam.translated(-8, 7), false));
        assert!(!view.is_in_range_ex(&w, cam.translated(10, 0), false));
    }

    #[test]
    fn top_tile_walks_down_from_the_first_floor() {
        let (mut w, cam) = world_at(7);
        let target = cam.translated(2, 2);
        w.set_tile(target, TileFlags::GROUND | TileFlags::CLICKABLE);
        // clickable roof two floors up on the same screen cell
        let roof = Position::new(104, 104, 5);
        w.set_tile(roof, TileFlags::GROUND | TileFlags::CLICKABLE);

        let view = rebuilt(&w, cam);
        assert_eq!(view.first_visible_floor(), 0);
        assert_eq!(view.get_top_tile(&w, target).map(TileView::position), Some(roof));

        w.remove_tile(roof);
        assert_eq!(view.get_top_tile(&w, target).map(TileView::position), Some(target));

        // nothing clickable on the cell
        assert!(view.get_top_tile(&w, cam.translated(-3, 0)).is_none());
    }

    #[test]
    fn top_tile_in_transparent_mode_near_the_camera() {
        let (mut w, cam) = world_at(7);
        let target = cam.translated(1, 1);
        w.set_tile(Position::new(102, 102, 6), TileFlags::GROUND | TileFlags::CLICKABLE);
        let config = ViewConfig {
            floor_view_mode: FloorViewMode::AlwaysWithTransparency,
            ..ViewConfig::default()
        };
        let mut view = view_over(&w, cam, &config);
        view.update_visible_tiles(&w);
        assert_eq!(view.get_top_tile(&w, target).map(TileView::position), Some(target));
    }

    #[test]
    fn highlight_follows_mouse_and_shift() {
        let (mut w, cam) = world_at(7);
        let config = ViewConfig {
            draw_highlight_target: true,
            ..ViewConfig::default()
        };
        let mut view = view_over(&w, cam, &config);
        view.update_visible_tiles(&w);

        let over = cam.translated(1, 0);
        view.on_mouse_move(&w, over, false);
        assert_eq!(view.highlighted_tile(), Some(over));

        // shift: top clickable tile, none here
        view.set_shift_pressed(&w, true);
        assert_eq!(view.highlighted_tile(), None);

        w.set_tile(over, TileFlags::GROUND | TileFlags::CLICKABLE);
        view.set_shift_pressed(&w, false);
        view.set_shift_pressed(&w, true);
        assert_eq!(view.highlighted_tile(), Some(over));
    }

    #[test]
    fn mouse_follows_the_camera() {
        let (mut w, cam) = world_at(7);
        w.fill(6, ivec2(80, 80), ivec2(120, 120), TileFlags::GROUND);
        let mut view = rebuilt(&w, cam);
        view.on_mouse_move(&w, cam.translated(2, 0), false);

        view.set_camera_position(cam.translated(1, 0));
        view.update_visible_tiles(&w);
        assert_eq!(view.mouse_position(), Some(cam.translated(3, 0)));

        // one floor up and one step east: two steps east
        view.set_camera_position(Position::new(102, 100, 6));
        view.update_visible_tiles(&w);
        assert_eq!(view.mouse_position(), Some(Position::new(105, 100, 6)));
    }

    #[test]
    fn lights_follow_the_floor_and_the_minimum() {
        let (mut w, cam) = world_at(7);
        w.set_light(Light {
            intensity: 100,
            color: 215,
        });
        let config = ViewConfig {
            draw_lights: true,
            minimum_ambient_light: 0.5,
            ..ViewConfig::default()
        };
        let mut view = view_over(&w, cam, &config);
        view.on_global_light_change(&w);
        assert_eq!(view.light_view().unwrap().global_light().intensity, 127);
        assert!(view.is_drawing_lights());

        // underground: no daylight at all, only the minimum
        view.set_camera_position(cam.translated_z(0, 0, 3));
        view.update_visible_tiles(&w);
        assert_eq!(view.light_view().unwrap().global_light().color, 0);
        assert_eq!(view.light_view().unwrap().global_light().intensity, 127);

        view.set_draw_lights(&w, false);
        assert!(view.light_view().is_none());
        assert!(view.pool().events.contains(&PoolEvent::Enabled {
            pool: PoolType::Light,
            enabled: false,
        }));
    }

    #[test]
    fn floor_change_recollects_creatures_and_light_once() {
        let mut w = GridWorld::new();
        w.fill(7, ivec2(90, 90), ivec2(110, 110), TileFlags::GROUND);
        w.fill(8, ivec2(90, 90), ivec2(110, 110), TileFlags::GROUND);
        w.set_light(Light {
            intensity: 100,
            color: 215,
        });
        let above = w.add_creature(Position::new(101, 100, 7));
        let below = w.add_creature(Position::new(101, 100, 8));
        let config = ViewConfig {
            draw_lights: true,
            ..ViewConfig::default()
        };
        let cam = Position::new(100, 100, 7);
        let mut view = view_over(&w, cam, &config);
        view.update_visible_tiles(&w);
        assert_eq!(view.visible_creatures(), &[above]);
        assert_eq!(view.light_view().unwrap().global_light().intensity, 100);

        view.set_camera_position(cam.translated_z(0, 0, 1));
        view.update_visible_tiles(&w);
        assert_eq!(view.visible_creatures(), &[below]);
        assert_eq!(view.light_view().unwrap().global_light().intensity, 0);

        // same floor again: the list is not re-collected
        let late = w.add_creature(Position::new(102, 100, 8));
        view.update_visible_tiles(&w);
        assert_eq!(view.visible_creatures(), &[below]);

        view.set_camera_position(cam);
        view.update_visible_tiles(&w);
        view.set_camera_position(cam.translated_z(0, 0, 1));
        view.update_visible_tiles(&w);
        assert_eq!(view.visible_creatures().len(), 2);
        assert!(view.visible_creatures().contains(&late));
    }

    proptest! {
        #[test]
        fn odd_dimensions_keep_the_draw_margin(
            vx in (1i32..30).prop_map(|k| 2 * k + 1),
            vy in (1i32..30).prop_map(|k| 2 * k + 1),
        ) {
            let w = GridWorld::new();
            let mut view = view_over(&w, Position::new(100, 100, 7), &ViewConfig::default());
            prop_assert_eq!(view.set_visible_dimension(ivec2(vx, vy)), Ok(()));
            prop_assert_eq!(view.visible_dimension(), ivec2(vx, vy));
            prop_assert_eq!(view.draw_dimension(), ivec2(vx + 3, vy + 3));
        }
    }

    #[test]
    fn shader_crossfade_through_the_view() {
        let (w, cam) = world_at(7);
        let mut pool = RecordingPool::new();
        pool.default_shader = Some(1);
        let clock = ManualClock::new();
        let mut view = MapView::new(pool, clock.clone(), &ViewConfig::default(), &w).unwrap();
        view.set_camera_position(cam);
        assert_eq!(view.current_shader(), Some(1));

        view.set_shader(&w, Some(2), Duration::from_millis(100), Duration::from_millis(100));
        assert_eq!(view.shader_phase(), ShaderPhase::FadingOut);
        assert_eq!(view.current_shader(), Some(1));
        // same shader again: nothing changes
        view.set_shader(&w, Some(1), Duration::ZERO, Duration::ZERO);
        assert_eq!(view.shader_phase(), ShaderPhase::FadingOut);

        clock.advance_ms(150);
        view.shader.update(clock.now());
        assert_eq!(view.current_shader(), Some(2));
        assert_eq!(view.shader_phase(), ShaderPhase::FadingIn);
    }
}
