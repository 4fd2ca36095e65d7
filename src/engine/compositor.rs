//! Per-frame drawing of the map view.
//!
//! Pass order, each in its own pool:
//! 1. **Map** – floors deepest first; per floor grounds, surfaces,
//!    effects, missiles, then the floor shadow and the light shades of the
//!    floor above. The crosshair goes last.
//! 2. **Creature information** – names and bars, in destination space.
//! 3. **Light** – the light map assembled during pass 1.
//! 4. **Text** – static and animated texts of the camera floor.

use glam::{IVec2, Vec2, ivec2};
use tracing::trace;

use crate::defs::{
    FloorViewMode, InfoFlags, TRANSPARENT_FAR_OPACITY, TRANSPARENT_FLOOR_VIEW_RANGE,
    TRANSPARENT_NEAR_OPACITY,
};
use crate::engine::map_view::MapView;
use crate::engine::timer::Clock;
use crate::engine::types::RectCache;
use crate::renderer::{DrawCall, DrawPool, PoolType, ShaderUniforms, TextKind};
use crate::world::{Position, Rect, TextRef, TileView, WorldQuery};

/// Fade levels from here on are drawn fully opaque.
const OPAQUE_FADE: f32 = 0.99;

const BLACK: u32 = 0xFF_000000;

impl<P: DrawPool, C: Clock> MapView<P, C> {
    /// Draw one frame into `rect` (window pixels).
    pub fn draw<W: WorldQuery>(&mut self, world: &W, rect: Rect) {
        if self.refresh_tiles {
            self.update_visible_tiles(world);
        }

        if self.rect_cache.rect != rect {
            let src = self.projection.framebuffer_source(rect.size, self.pan(world));
            self.rect_cache = RectCache::new(rect, src);
        }

        if self.is_fading() {
            let level = self.fade_level(self.cached_first);
            if self.fader.take_fade_in_finished(level) {
                self.on_fade_in_finished();
            }
        }

        let camera = self.camera_position(world);
        self.draw_floors(world, camera);

        // player position not known yet
        let Some(cam) = camera else {
            return;
        };

        self.draw_creature_information(world, cam);
        if let Some(light) = &mut self.light {
            light.draw(&mut self.pool, self.rect_cache.rect, self.rect_cache.src_rect);
        }
        self.draw_texts(world, cam);
    }

    /// Whether upper floor `z` is see-through around the camera, and the
    /// camera shifted onto that floor's screen cell.
    fn transparent_floor(&self, cam: Position, z: u8, below: u8) -> Option<Position> {
        if self.floor_view_mode != FloorViewMode::AlwaysWithTransparency || z >= below {
            return None;
        }
        let mut covered = cam;
        covered
            .covered_up(cam.z - z as i32)
            .then_some(covered)
    }

    fn draw_floors<W: WorldQuery>(&mut self, world: &W, camera: Option<Position>) {
        self.pool
            .use_pool(PoolType::Map, self.rect_cache.rect, self.rect_cache.src_rect);

        let Some(cam) = camera else {
            self.pool.flush();
            return;
        };

        self.before_draw(cam);

        let fading = self.is_fading();
        let range = TRANSPARENT_FLOOR_VIEW_RANGE;
        let scale = self.projection.scale();
        let (floor_min, floor_max) = (self.tiles.floor_min(), self.tiles.floor_max());

        for z in (floor_min..=floor_max).rev() {
            if fading {
                let level = self.fade_level(z);
                if level == 0.0 {
                    break;
                }
                if level < OPAQUE_FADE {
                    self.pool.set_opacity(level);
                }
            }

            let transparent = self.transparent_floor(cam, z, self.cached_first);
            let floor = self.tiles.floor(z);

            for (tiles, ground) in [(&floor.grounds, true), (&floor.surfaces, false)] {
                for &pos in tiles {
                    let Some(tile) = world.tile(pos) else {
                        continue;
                    };
                    if !tile.can_render(cam, self.viewport, self.draw_viewport_edge) {
                        continue;
                    }
                    if let Some(center) = transparent {
                        let near = pos.is_in_range(&center, range, range, true);
                        self.pool.set_opacity(if near {
                            TRANSPARENT_NEAR_OPACITY
                        } else {
                            TRANSPARENT_FAR_OPACITY
                        });
                    }
                    let dest = self.projection.transform(pos, cam);
                    self.pool.draw(if ground {
                        DrawCall::Ground {
                            tile: pos,
                            dest,
                            scale,
                        }
                    } else {
                        DrawCall::Surface {
                            tile: pos,
                            dest,
                            scale,
                        }
                    });
                    if transparent.is_some() {
                        self.pool.reset_opacity();
                    }
                }
            }

            for &pos in &floor.effects {
                let dest = self.projection.transform(pos, cam);
                self.pool.draw(DrawCall::Effects {
                    tile: pos,
                    dest,
                    scale,
                });
            }

            for missile in world.floor_missiles(z) {
                self.pool.draw(DrawCall::Missile {
                    id: missile.id,
                    dest: self.projection.transform(missile.position, cam),
                    scale,
                });
            }

            if self.shadow_floor_intensity > 0.0 && z as i32 == cam.z + 1 {
                self.pool.draw(DrawCall::FilledRect {
                    rect: self.rect_dimension,
                    color: BLACK,
                    opacity: self.shadow_floor_intensity,
                });
            }

            self.add_shades(cam, z, fading);

            if fading {
                self.pool.reset_opacity();
            }
            self.pool.flush();
        }

        self.draw_crosshair(cam);
        self.after_draw();
    }

    /// Shades of the floor above `z` darken the light map over `z`.
    fn add_shades(&mut self, cam: Position, z: u8, fading: bool) {
        if !self.is_drawing_lights() || z == 0 || z - 1 < self.tiles.floor_min() {
            return;
        }
        let next = z - 1;
        let level = if fading { self.fade_level(next) } else { 1.0 };
        if level == 0.0 {
            return;
        }

        let range = TRANSPARENT_FLOOR_VIEW_RANGE;
        let below = cam.floor();
        let transparent = self.transparent_floor(cam, next, below);
        let Some(light) = &mut self.light else {
            return;
        };
        for &pos in &self.tiles.floor(next).shades {
            if transparent.is_some_and(|c| pos.is_in_range(&c, range, range, true)) {
                continue;
            }
            light.add_shade(self.projection.transform(pos, cam), level);
        }
    }

    fn draw_crosshair(&mut self, cam: Position) {
        let inside = self
            .window_mouse
            .is_some_and(|p| self.rect_cache.rect.contains(p));
        if inside {
            if let (Some(texture), Some(mouse)) = (self.crosshair, self.mouse_position) {
                let size = self.projection.tile_size();
                self.pool.draw(DrawCall::TexturedRect {
                    rect: Rect {
                        origin: self.projection.transform(mouse, cam),
                        size: IVec2::splat(size),
                    },
                    texture,
                });
            }
        } else if self.highlight.is_some() {
            self.mouse_position = None;
            self.highlight = None;
        }
    }

    /*──────────────────────── shader hooks ────────────────────────*/

    fn before_draw(&mut self, cam: Position) {
        let opacity = self.shader.update(self.clock.now());

        if let Some(shader) = self.shader.current() {
            if self.pool.has_shaders() {
                let uniforms = self.shader_uniforms(cam);
                self.pool.bind_shader(shader, &uniforms);
            }
        }
        self.pool.set_opacity(opacity);
    }

    fn after_draw(&mut self) {
        self.pool.reset_shader();
        self.pool.reset_opacity();
    }

    fn shader_uniforms(&self, cam: Position) -> ShaderUniforms {
        let dim = self.rect_dimension.size.as_vec2();
        let draw = self.projection.draw();
        let tile = self.projection.tile_size();

        let center = self.rect_cache.src_rect.center().as_vec2();
        let global = ivec2(cam.x - draw.x / 2, -(cam.y - draw.y / 2)) * tile;
        let origin = self.shader.origin().unwrap_or(cam);
        let mut walk = self.projection.transform(cam, origin);
        walk.y = -walk.y;

        ShaderUniforms {
            center_coord: Vec2::new(center.x / dim.x, 1.0 - center.y / dim.y),
            global_coord: global.as_vec2() / dim.y,
            zoom: self.projection.scale(),
            walk_offset: walk.as_vec2() / dim,
        }
    }

    /*──────────────────────── overlays ────────────────────────*/

    fn draw_creature_information<W: WorldQuery>(&mut self, world: &W, cam: Position) {
        let mut flags = InfoFlags::empty();
        flags.set(InfoFlags::NAMES, self.draw_names);
        flags.set(InfoFlags::BARS, self.draw_health_bars);
        flags.set(InfoFlags::MANA_BAR, self.draw_mana_bar);
        if flags.is_empty() {
            return;
        }

        let range = TRANSPARENT_FLOOR_VIEW_RANGE;
        let cache = self.rect_cache;
        self.pool
            .use_pool(PoolType::CreatureInformation, Rect::default(), Rect::default());
        for &id in self.tiles.creatures() {
            let Some(state) = world.creature(id) else {
                continue;
            };
            if state.dead || !state.can_be_seen {
                continue;
            }
            let Some(tile) = world.tile(state.position) else {
                continue;
            };

            let pos = tile.position();
            let mut gray = world.is_covered(pos, self.cached_first);
            if gray && self.floor_view_mode == FloorViewMode::AlwaysWithTransparency {
                gray = !pos.is_in_range(&cam, range, range, true);
            }

            self.pool.draw(DrawCall::CreatureInfo {
                creature: id,
                clip: cache.rect,
                dest: self.projection.transform(state.position, cam),
                scale: self.projection.scale(),
                draw_offset: cache.draw_offset,
                stretch: cache.stretch,
                gray,
                flags,
            });
        }
        self.pool.flush();
    }

    fn draw_texts<W: WorldQuery>(&mut self, world: &W, cam: Position) {
        let (statics, animated) = (world.static_texts(), world.animated_texts());
        if !self.draw_texts || (statics.is_empty() && animated.is_empty()) {
            return;
        }

        self.pool
            .use_pool(PoolType::Text, Rect::default(), Rect::default());
        let texts = statics
            .iter()
            .filter(|t| t.has_message)
            .map(|t| (TextKind::Static, t))
            .chain(animated.iter().map(|t| (TextKind::Animated, t)));
        for (kind, text) in texts {
            if let Some(point) = self.text_point(text, cam) {
                self.pool.draw(DrawCall::Text {
                    kind,
                    id: text.id,
                    point,
                    clip: self.rect_cache.rect,
                });
            }
        }
        self.pool.flush();
        trace!(statics = statics.len(), animated = animated.len(), "texts drawn");
    }

    /// Destination point of a text, or `None` off the camera floor.
    fn text_point(&self, text: &TextRef, cam: Position) -> Option<IVec2> {
        (text.position.z == cam.z)
            .then(|| self.rect_cache.to_dest(self.projection.transform(text.position, cam)))
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::defs::TileFlags;
    use crate::engine::timer::ManualClock;
    use crate::renderer::{PoolEvent, RecordingPool, Software};
    use crate::world::{GridWorld, Light};

    type View = MapView<RecordingPool, ManualClock>;

    const SCREEN: Rect = Rect::new(0, 0, 480, 352);

    fn sea_level() -> (GridWorld, Position) {
        let mut w = GridWorld::new();
        w.fill(7, ivec2(80, 80), ivec2(120, 120), TileFlags::GROUND);
        (w, Position::new(100, 100, 7))
    }

    fn view(world: &GridWorld, cam: Position, config: ViewConfig) -> (View, ManualClock) {
        let clock = ManualClock::new();
        let mut view = MapView::new(RecordingPool::new(), clock.clone(), &config, world).unwrap();
        view.set_camera_position(cam);
        view.pool_mut().clear();
        (view, clock)
    }

    fn grounds(events: &[PoolEvent]) -> Vec<Position> {
        events
            .iter()
            .filter_map(|e| match e {
                PoolEvent::Draw(DrawCall::Ground { tile, .. }) => Some(*tile),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn visible_window_is_fifteen_by_eleven() {
        let (w, cam) = sea_level();
        let (mut v, _) = view(&w, cam, ViewConfig::default());
        v.draw(&w, SCREEN);

        let drawn = grounds(&v.pool().events);
        assert_eq!(drawn.len(), 15 * 11);
        assert!(drawn.contains(&cam.translated(-7, -5)));
        assert!(drawn.contains(&cam.translated(7, 5)));
        assert!(!drawn.contains(&cam.translated(8, 0)));
        // the camera ground sits in the centre cell of the buffer
        assert!(v.pool().draws().any(|c| matches!(
            c,
            DrawCall::Ground { tile, dest, .. } if *tile == cam && *dest == ivec2(256, 192)
        )));
    }

    #[test]
    fn floors_are_drawn_deepest_first_and_flushed() {
        let (mut w, cam) = sea_level();
        let roof = Position::new(101, 101, 6);
        w.set_tile(roof, TileFlags::GROUND);
        let (mut v, _) = view(&w, cam, ViewConfig::default());
        v.draw(&w, SCREEN);

        let map = v.pool().pool_events(PoolType::Map);
        let drawn = grounds(map);
        assert_eq!(drawn.last(), Some(&roof));
        assert_eq!(map.iter().filter(|e| **e == PoolEvent::Flush).count(), 2);
        assert_eq!(map.last(), Some(&PoolEvent::ResetOpacity));
    }

    #[test]
    fn no_camera_only_clears_the_map() {
        let (w, _) = sea_level();
        let (mut v, _) = view(&w, Position::new(100, 100, 7), ViewConfig::default());
        v.follow_creature(999);
        v.draw(&w, SCREEN);

        let ev = &v.pool().events;
        assert!(matches!(ev[0], PoolEvent::Use { pool: PoolType::Map, .. }));
        assert_eq!(&ev[1..], &[PoolEvent::Flush]);
    }

    #[test]
    fn shadow_under_the_camera_floor() {
        let config = ViewConfig {
            shadow_floor_intensity: 0.3,
            ..ViewConfig::default()
        };
        let shadows = |v: &View| {
            v.pool()
                .draws()
                .filter(|c| matches!(c, DrawCall::FilledRect { opacity, .. } if *opacity == 0.3))
                .count()
        };

        let mut cave = GridWorld::new();
        cave.fill(8, ivec2(80, 80), ivec2(120, 120), TileFlags::GROUND);
        cave.fill(9, ivec2(80, 80), ivec2(120, 120), TileFlags::GROUND);
        let (mut v, _) = view(&cave, Position::new(100, 100, 8), config.clone());
        v.draw(&cave, SCREEN);
        assert_eq!(shadows(&v), 1);

        // at sea level the floor below is never drawn
        let (mut w, cam) = sea_level();
        w.fill(8, ivec2(80, 80), ivec2(120, 120), TileFlags::GROUND);
        let (mut v, _) = view(&w, cam, config);
        v.draw(&w, SCREEN);
        assert_eq!(shadows(&v), 0);
    }

    #[test]
    fn always_with_transparency_dims_upper_floors() {
        let (mut w, cam) = sea_level();
        // roof covering the camera and one far away
        w.fill(6, ivec2(90, 90), ivec2(110, 110), TileFlags::GROUND | TileFlags::LIMITS_VIEW);
        let config = ViewConfig {
            floor_view_mode: FloorViewMode::AlwaysWithTransparency,
            ..ViewConfig::default()
        };
        let (mut v, _) = view(&w, cam, config);
        v.draw(&w, SCREEN);
        assert_eq!(v.first_visible_floor(), 7);
        assert_eq!(v.floor_min(), 6);

        let ev = &v.pool().events;
        let opacity_before = |target: Position| {
            let i = ev
                .iter()
                .position(|e| matches!(e, PoolEvent::Draw(DrawCall::Ground { tile, .. }) if *tile == target))
                .unwrap();
            ev[i - 1].clone()
        };
        // covering cell of the camera on floor 6 is (101, 101)
        assert_eq!(
            opacity_before(Position::new(101, 101, 6)),
            PoolEvent::Opacity(TRANSPARENT_NEAR_OPACITY)
        );
        assert_eq!(
            opacity_before(Position::new(96, 101, 6)),
            PoolEvent::Opacity(TRANSPARENT_FAR_OPACITY)
        );
    }

    #[test]
    fn fading_floor_stops_the_loop_when_invisible() {
        let (mut w, cam) = sea_level();
        w.set_tile(Position::new(101, 101, 6), TileFlags::GROUND);
        let config = ViewConfig {
            floor_view_mode: FloorViewMode::Fade,
            ..ViewConfig::default()
        };
        let (mut v, clock) = view(&w, cam, config);
        v.draw(&w, SCREEN);
        // first frame after a jump: every floor fully shown
        assert!(grounds(&v.pool().events).contains(&Position::new(101, 101, 6)));
        assert_eq!(v.fade_level(6), 1.0);

        // a roof appears right above: floor 6 starts fading out
        clock.advance_ms(1_000);
        w.set_tile(Position::new(100, 100, 6), TileFlags::GROUND | TileFlags::LIMITS_VIEW);
        v.on_tile_update(Position::new(100, 100, 6), false);
        v.pool_mut().clear();
        v.draw(&w, SCREEN);
        assert_eq!(v.first_visible_floor(), 7);
        assert_eq!(v.fade_level(6), 1.0);

        clock.advance_ms(250);
        v.pool_mut().clear();
        v.draw(&w, SCREEN);
        assert!(v.pool().events.contains(&PoolEvent::Opacity(0.5)));

        clock.advance_ms(500);
        v.pool_mut().clear();
        v.draw(&w, SCREEN);
        assert!(!grounds(&v.pool().events).contains(&Position::new(101, 101, 6)));
    }

    #[test]
    fn fade_in_finished_refreshes_once() {
        let (mut w, cam) = sea_level();
        let config = ViewConfig {
            floor_view_mode: FloorViewMode::Fade,
            ..ViewConfig::default()
        };
        let (mut v, clock) = view(&w, cam, config);
        v.draw(&w, SCREEN);
        // first level reached 1.0 on the very first frame
        assert!(v.needs_refresh());
        v.draw(&w, SCREEN);
        assert!(!v.needs_refresh());

        // a roof hides the sky, then goes away again
        let roof = Position::new(100, 100, 6);
        w.set_tile(roof, TileFlags::GROUND | TileFlags::LIMITS_VIEW);
        v.on_tile_update(roof, false);
        v.draw(&w, SCREEN);
        clock.advance_ms(600);
        v.draw(&w, SCREEN);

        w.remove_tile(roof);
        v.on_tile_update(roof, false);
        v.draw(&w, SCREEN);
        assert_eq!(v.first_visible_floor(), 0);
        assert_eq!(v.fade_level(0), 0.0);
        assert!(!v.needs_refresh());

        clock.advance_ms(600);
        v.draw(&w, SCREEN);
        assert!(v.needs_refresh());
    }

    #[test]
    fn shader_bound_with_uniforms_then_reset() {
        let (w, cam) = sea_level();
        let mut pool = RecordingPool::new();
        pool.default_shader = Some(4);
        let mut v = MapView::new(pool, ManualClock::new(), &ViewConfig::default(), &w).unwrap();
        v.set_camera_position(cam);
        v.draw(&w, SCREEN);

        let map = v.pool().pool_events(PoolType::Map);
        let PoolEvent::BindShader(4, uniforms) = &map[0] else {
            panic!("shader not bound first: {:?}", map.first());
        };
        assert_eq!(uniforms.zoom, 1.0);
        // src rect (32, 32, 480, 352) → centre (271, 207) over 576 x 448
        assert!((uniforms.center_coord.x - 271.0 / 576.0).abs() < 1e-6);
        assert!((uniforms.center_coord.y - (1.0 - 207.0 / 448.0)).abs() < 1e-6);
        assert!((uniforms.global_coord.x - (91.0 * 32.0) / 448.0).abs() < 1e-4);
        assert!((uniforms.global_coord.y + (93.0 * 32.0) / 448.0).abs() < 1e-4);
        assert_eq!(map[1], PoolEvent::Opacity(1.0));
        let tail = &map[map.len() - 2..];
        assert_eq!(tail, &[PoolEvent::ResetShader, PoolEvent::ResetOpacity]);
    }

    #[test]
    fn crosshair_only_while_the_mouse_is_inside() {
        let (w, cam) = sea_level();
        let mut pool = RecordingPool::new();
        let tex = pool.register_texture("crosshair.png");
        let config = ViewConfig {
            crosshair: Some("crosshair.png".into()),
            draw_highlight_target: true,
            ..ViewConfig::default()
        };
        let mut v = MapView::new(pool, ManualClock::new(), &config, &w).unwrap();
        v.set_camera_position(cam);
        v.on_mouse_move(&w, cam, false);
        v.on_window_mouse_move(Some(ivec2(240, 176)));
        v.draw(&w, SCREEN);
        assert!(v.pool().draws().any(|c| *c
            == DrawCall::TexturedRect {
                rect: Rect::new(256, 192, 32, 32),
                texture: tex,
            }));

        v.on_window_mouse_move(None);
        v.pool_mut().clear();
        v.draw(&w, SCREEN);
        assert!(!v.pool().draws().any(|c| matches!(c, DrawCall::TexturedRect { .. })));
        assert_eq!(v.highlighted_tile(), None);
        assert_eq!(v.mouse_position(), None);
    }

    #[test]
    fn creature_information_grays_covered_creatures() {
        let (mut w, cam) = sea_level();
        let open = w.add_creature(cam.translated(2, 0));
        let under_roof = w.add_creature(cam.translated(-3, 0));
        w.set_tile(Position::new(98, 101, 6), TileFlags::GROUND | TileFlags::LIMITS_VIEW);
        let dead = w.add_creature(cam.translated(1, 1));
        w.creature_mut(dead).unwrap().dead = true;

        let (mut v, _) = view(&w, cam, ViewConfig::default());
        v.draw(&w, SCREEN);

        let infos: Vec<_> = v
            .pool()
            .pool_events(PoolType::CreatureInformation)
            .iter()
            .filter_map(|e| match e {
                PoolEvent::Draw(DrawCall::CreatureInfo {
                    creature,
                    gray,
                    flags,
                    ..
                }) => Some((*creature, *gray, *flags)),
                _ => None,
            })
            .collect();
        let all = InfoFlags::NAMES | InfoFlags::BARS | InfoFlags::MANA_BAR;
        assert_eq!(infos.len(), 2);
        assert!(infos.contains(&(open, false, all)));
        assert!(infos.contains(&(under_roof, true, all)));

        v.set_draw_names(false);
        v.set_draw_health_bars(false);
        v.set_draw_mana_bar(false);
        v.pool_mut().clear();
        v.draw(&w, SCREEN);
        assert!(v.pool().pool_events(PoolType::CreatureInformation).is_empty());
    }

    #[test]
    fn texts_only_on_the_camera_floor() {
        let (mut w, cam) = sea_level();
        let shown = w.add_static_text(cam.translated(1, 0), true);
        w.add_static_text(cam.translated(2, 0), false);
        w.add_static_text(cam.translated_z(0, 0, -1), true);
        let floating = w.add_animated_text(cam);

        let screen = Rect::new(100, 50, 960, 704);
        let (mut v, _) = view(&w, cam, ViewConfig::default());
        v.draw(&w, screen);

        let texts: Vec<_> = v
            .pool()
            .draws()
            .filter_map(|c| match c {
                DrawCall::Text {
                    kind, id, point, ..
                } => Some((*kind, *id, *point)),
                _ => None,
            })
            .collect();
        // fb (288, 192) - (32, 32) = (256, 160), x2 + (100, 50)
        assert_eq!(
            texts,
            vec![
                (TextKind::Static, shown, ivec2(612, 370)),
                (TextKind::Animated, floating, ivec2(548, 370)),
            ]
        );
    }

    #[test]
    fn light_map_collects_shades_of_the_floor_above() {
        let (mut w, cam) = sea_level();
        w.set_light(Light {
            intensity: 40,
            color: 215,
        });
        w.set_tile(Position::new(104, 101, 6), TileFlags::GROUND | TileFlags::SHADE);
        let config = ViewConfig {
            draw_lights: true,
            ..ViewConfig::default()
        };
        let (mut v, _) = view(&w, cam, config);
        v.on_global_light_change(&w);
        v.draw(&w, SCREEN);

        let light = v.pool().pool_events(PoolType::Light);
        let Some(PoolEvent::Draw(DrawCall::LightMap {
            ambient, shades, ..
        })) = light.first()
        else {
            panic!("no light map: {light:?}");
        };
        assert_eq!(ambient.intensity, 40);
        assert_eq!(shades.len(), 1);
        // (104, 101, 6) shares the cell of (103, 100, 7)
        assert_eq!(shades[0].dest, ivec2(11 * 32, 6 * 32));
    }

    #[test]
    fn far_missiles_and_texts_do_not_break_the_software_frame() {
        let (mut w, cam) = sea_level();
        w.add_missile(Position::new(120, 100, 7));
        w.add_missile(Position::new(100, 118, 7));
        w.add_animated_text(Position::new(119, 100, 7));
        let mut v = MapView::new(
            Software::new(),
            ManualClock::new(),
            &ViewConfig::default(),
            &w,
        )
        .unwrap();
        v.set_camera_position(cam);

        v.pool_mut().begin_frame(480, 352);
        v.draw(&w, SCREEN);
        let mut size = (0, 0);
        v.pool_mut().end_frame(|_, fw, fh| size = (fw, fh));
        assert_eq!(size, (480, 352));
    }
}
