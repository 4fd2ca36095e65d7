use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::ivec2;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mapview_rs::{
    config::ViewConfig,
    defs::{AntialiasingMode, FloorViewMode, TileFlags},
    engine::{MapView, SystemClock},
    renderer::Software,
    world::{CreatureId, GridWorld, Light, Position, Rect, WorldQuery},
};

/// Software viewer for the multi-floor map view.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// TOML file with view settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long, default_value_t = 960)]
    width: usize,

    /// Window height in pixels
    #[arg(long, default_value_t = 704)]
    height: usize,
}

const PAN_STEP: i32 = 8;
const PATROL_EVERY: u32 = 20;

/// Demo town: grass at sea level, a roofed house, a cave below and a
/// tower reaching the sky.
fn build_world() -> GridWorld {
    let mut w = GridWorld::new();
    w.fill(7, ivec2(60, 60), ivec2(140, 140), TileFlags::GROUND | TileFlags::CLICKABLE);

    // house: walls and a roof one level up
    for i in 95..=105 {
        for (x, y) in [(i, 95), (i, 105), (95, i), (105, i)] {
            w.set_tile(
                Position::new(x, y, 7),
                TileFlags::GROUND | TileFlags::SURFACE | TileFlags::BLOCKS_LOOK,
            );
        }
    }
    w.fill(
        6,
        ivec2(96, 96),
        ivec2(106, 106),
        TileFlags::GROUND | TileFlags::LIMITS_VIEW | TileFlags::SHADE | TileFlags::CLICKABLE,
    );

    // tower
    for z in 2..=6 {
        let d = 7 - z;
        w.fill(
            z,
            ivec2(80 + d, 110 + d),
            ivec2(83 + d, 113 + d),
            TileFlags::GROUND | TileFlags::LIMITS_VIEW | TileFlags::SHADE,
        );
    }

    // cave below the meadow
    w.fill(8, ivec2(110, 80), ivec2(130, 100), TileFlags::GROUND | TileFlags::CLICKABLE);
    w.fill(9, ivec2(112, 82), ivec2(128, 98), TileFlags::GROUND | TileFlags::EFFECT);

    w.add_missile(Position::new(92, 100, 7));
    w.add_static_text(Position::new(100, 93, 7), true);
    w.add_animated_text(Position::new(88, 100, 7));
    w.set_light(Light {
        intensity: 120,
        color: 215,
    });
    w
}

const PATROL: [(i32, i32); 4] = [(90, 90), (110, 90), (110, 110), (90, 110)];

/// Walk one step along the patrol square.
fn patrol_step(
    world: &mut GridWorld,
    view: &mut MapView<Software, SystemClock>,
    id: CreatureId,
    leg: &mut usize,
) {
    let Some(from) = world.creature(id).map(|c| c.position) else {
        return;
    };
    let (tx, ty) = PATROL[*leg];
    if (from.x, from.y) == (tx, ty) {
        *leg = (*leg + 1) % PATROL.len();
        return;
    }
    let to = Position::new(from.x + (tx - from.x).signum(), from.y + (ty - from.y).signum(), 7);
    world.move_creature(id, to);
    view.on_tile_update(from, true);
    view.on_tile_update(to, true);
    view.on_camera_move(&*world);
}

fn next_floor_mode(mode: FloorViewMode) -> FloorViewMode {
    match mode {
        FloorViewMode::Normal => FloorViewMode::Fade,
        FloorViewMode::Fade => FloorViewMode::Locked,
        FloorViewMode::Locked => FloorViewMode::Always,
        FloorViewMode::Always => FloorViewMode::AlwaysWithTransparency,
        FloorViewMode::AlwaysWithTransparency => FloorViewMode::Normal,
    }
}

fn next_antialiasing(mode: AntialiasingMode) -> AntialiasingMode {
    match mode {
        AntialiasingMode::Disabled => AntialiasingMode::Enabled,
        AntialiasingMode::Enabled => AntialiasingMode::SmoothRetro,
        AntialiasingMode::SmoothRetro => AntialiasingMode::Disabled,
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::parse();
    let config = match &opts.config {
        Some(path) => ViewConfig::from_file(path)?,
        None => ViewConfig::default(),
    };
    info!(?config, "view settings");

    let mut world = build_world();
    let walker = world.add_creature(Position::new(PATROL[0].0, PATROL[0].1, 7));
    world.add_creature(Position::new(100, 100, 7));
    world.add_creature(Position::new(120, 90, 8));
    let mut leg = 1;

    let mut view = MapView::new(Software::new(), SystemClock::new(), &config, &world)?;
    view.set_camera_position(Position::new(100, 100, 7));

    let (w, h) = (opts.width, opts.height);
    let screen = Rect::new(0, 0, w as i32, h as i32);
    let mut win = Window::new("Map View Software Render", w, h, WindowOptions::default())?;
    win.set_target_fps(60);

    let mut frame = 0u32;
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        /* camera */
        let (mut dx, mut dy) = (0, 0);
        if win.is_key_down(Key::Left) {
            dx -= PAN_STEP;
        }
        if win.is_key_down(Key::Right) {
            dx += PAN_STEP;
        }
        if win.is_key_down(Key::Up) {
            dy -= PAN_STEP;
        }
        if win.is_key_down(Key::Down) {
            dy += PAN_STEP;
        }
        if (dx, dy) != (0, 0) && !view.is_following_creature() {
            view.move_by(&world, dx, dy);
        }

        let floor_step = if win.is_key_pressed(Key::PageUp, KeyRepeat::No) {
            -1
        } else if win.is_key_pressed(Key::PageDown, KeyRepeat::No) {
            1
        } else {
            0
        };
        if floor_step != 0 {
            if let Some(cam) = view.camera_position(&world) {
                let next = cam.translated_z(0, 0, floor_step);
                if next.is_valid() {
                    view.set_camera_position(next);
                }
            }
        }

        if win.is_key_pressed(Key::C, KeyRepeat::No) {
            if view.is_following_creature() {
                if let Some(cam) = view.camera_position(&world) {
                    view.set_camera_position(cam);
                }
            } else {
                view.follow_creature(walker);
            }
        }

        /* settings */
        if win.is_key_pressed(Key::F, KeyRepeat::No) {
            let mode = next_floor_mode(view.floor_view_mode());
            info!(?mode, "floor view mode");
            view.set_floor_view_mode(mode);
        }
        if win.is_key_pressed(Key::L, KeyRepeat::No) {
            let enable = view.light_view().is_none();
            view.set_draw_lights(&world, enable);
        }
        if win.is_key_pressed(Key::A, KeyRepeat::No) {
            let mode = next_antialiasing(view.antialiasing_mode());
            if let Err(err) = view.set_antialiasing_mode(mode) {
                warn!(%err, "antialiasing unchanged");
            }
        }
        if win.is_key_pressed(Key::N, KeyRepeat::No) {
            let enable = !view.is_drawing_names();
            view.set_draw_names(enable);
        }
        let shift = win.is_key_down(Key::LeftShift) || win.is_key_down(Key::RightShift);
        view.set_shift_pressed(&world, shift);

        /* mouse */
        let mouse = win
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| ivec2(x as i32, y as i32));
        view.on_window_mouse_move(mouse);
        if let Some(point) = mouse {
            if let Some(pos) = view.get_position(&world, point - screen.origin, screen.size) {
                if view.mouse_position() != Some(pos) {
                    view.on_mouse_move(&world, pos, false);
                }
            }
        }

        /* world */
        frame = frame.wrapping_add(1);
        if frame % PATROL_EVERY == 0 {
            patrol_step(&mut world, &mut view, walker, &mut leg);
        }

        /* draw */
        view.pool_mut().begin_frame(w, h);
        view.draw(&world, screen);
        let mut submitted = Ok(());
        view.pool_mut().end_frame(|fb, fw, fh| {
            acc_time += t0.elapsed();
            acc_frames += 1;
            submitted = win.update_with_buffer(fb, fw, fh);
        });
        submitted?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames.max(1) as f64;
            info!(
                avg_ms,
                fps = 1000.0 / avg_ms,
                first = view.first_visible_floor(),
                last = view.last_visible_floor(),
                "render stats"
            );
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
