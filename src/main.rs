//! tilestream viewer
//!
//! Opens a world description (`world.ron` by default, or the first
//! argument), preloads the tiles around the start position, then lets you
//! fly over the world:
//!
//! - arrow keys / WASD: pan (hold shift to go faster)
//! - `+` / `-`: grow or shrink the resident tile budget
//! - escape: quit
//!
//! A probe box follows the camera centre and shows what it collides with.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use macroquad::prelude::*;
use tilestream::tile::tiles_in_rect;
use tilestream::{CollisionInfo, DirectorySource, Point, QuadRenderer, Rect as WorldRect, TileCache, WorldConfig, VERSION};

/// Probe box size in world pixels
const PROBE_W: i32 = 12;
const PROBE_H: i32 = 20;
/// How far the probe looks on each side
const PROBE_DISTANCE: i32 = 24;

const PAN_SPEED: f32 = 400.0;
const FAST_PAN_SPEED: f32 = 1600.0;

type ViewerResult<T> = Result<T, Box<dyn std::error::Error>>;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("tilestream v{}", VERSION),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("world.ron"));

    if let Err(e) = run(&path).await {
        log::error!("{}", e);
        show_error(&format!("{}: {}", path.display(), e)).await;
    }
}

async fn run(path: &Path) -> ViewerResult<()> {
    let config = WorldConfig::load(path)?;
    log::info!(
        "world {} with {}px tiles, budget {} tiles",
        config.data_dir.display(),
        config.tile_size,
        config.cache_size
    );

    let source = Arc::new(DirectorySource::new(&config.data_dir));
    let mut cache = TileCache::new(QuadRenderer::new(), source, config.cache_config())?;

    let mut camera = (config.start.x as f32, config.start.y as f32);
    preload(&mut cache, view_rect(camera), config.tile_size).await?;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let speed = if is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift) {
            FAST_PAN_SPEED
        } else {
            PAN_SPEED
        };
        let step = speed * get_frame_time();
        if is_key_down(KeyCode::Left) || is_key_down(KeyCode::A) {
            camera.0 -= step;
        }
        if is_key_down(KeyCode::Right) || is_key_down(KeyCode::D) {
            camera.0 += step;
        }
        if is_key_down(KeyCode::Up) || is_key_down(KeyCode::W) {
            camera.1 -= step;
        }
        if is_key_down(KeyCode::Down) || is_key_down(KeyCode::S) {
            camera.1 += step;
        }

        if is_key_pressed(KeyCode::Equal) || is_key_pressed(KeyCode::KpAdd) {
            cache.set_cache_size(cache.cache_size() + 8);
        }
        if is_key_pressed(KeyCode::Minus) || is_key_pressed(KeyCode::KpSubtract) {
            cache.set_cache_size(cache.cache_size().saturating_sub(8).max(1));
        }

        let view = view_rect(camera);
        cache.update_cache(view, config.precache_x, config.precache_y)?;

        clear_background(Color::from_rgba(30, 30, 35, 255));
        cache.render(view);

        let center = view.center();
        let probe = WorldRect::centered(center, PROBE_W, PROBE_H);
        let mut coll = CollisionInfo::new();
        cache.update_collisions(&mut coll, probe, PROBE_DISTANCE)?;
        draw_probe(probe, &coll, view.top_left());

        let stats = cache.stats();
        let hud = format!(
            "({}, {})  resident {}/{}  textures {}  queued {}{}  fps {}",
            center.x,
            center.y,
            stats.resident,
            cache.cache_size(),
            stats.materialized,
            stats.queued,
            if stats.loading { " +1" } else { "" },
            get_fps()
        );
        draw_text(&hud, 10.0, 20.0, 20.0, WHITE);

        next_frame().await;
    }

    Ok(())
}

/// World rectangle under the window, centred on the camera
fn view_rect(camera: (f32, f32)) -> WorldRect {
    let center = Point::new(camera.0.round() as i32, camera.1.round() as i32);
    WorldRect::centered(center, screen_width() as i32, screen_height() as i32)
}

/// Load the start view one tile column at a time, with a progress bar
async fn preload(cache: &mut TileCache<QuadRenderer>, view: WorldRect, tile_size: u32) -> ViewerResult<()> {
    let total = tiles_in_rect(view, tile_size).count();
    let columns: Vec<i32> = {
        let mut xs: Vec<i32> = tiles_in_rect(view, tile_size).map(|c| c.x).collect();
        xs.dedup();
        xs
    };

    let mut done = 0;
    for x in columns {
        let column = WorldRect::new(x * tile_size as i32, view.y, tile_size as i32, view.h);
        let loaded_before = done;
        cache.preload_sync_with_progress(column, |n, _| done = loaded_before + n)?;

        clear_background(Color::from_rgba(30, 30, 35, 255));
        draw_progress(done, total);
        next_frame().await;
    }
    Ok(())
}

fn draw_progress(done: usize, total: usize) {
    let w = screen_width() * 0.5;
    let x = (screen_width() - w) * 0.5;
    let y = screen_height() * 0.5;
    let frac = if total == 0 { 1.0 } else { done as f32 / total as f32 };

    draw_rectangle_lines(x, y, w, 16.0, 2.0, GRAY);
    draw_rectangle(x + 2.0, y + 2.0, (w - 4.0) * frac, 12.0, LIGHTGRAY);
    draw_text(&format!("loading tiles {}/{}", done, total), x, y - 8.0, 20.0, WHITE);
}

/// Outline the probe and mark the nearest blocking pixel on each side
fn draw_probe(probe: WorldRect, coll: &CollisionInfo, origin: Point) {
    let px = (probe.x - origin.x) as f32;
    let py = (probe.y - origin.y) as f32;
    draw_rectangle_lines(px, py, probe.w as f32, probe.h as f32, 1.0, YELLOW);

    let mark = |p: Point| {
        draw_rectangle((p.x - origin.x) as f32, (p.y - origin.y) as f32, 1.0, 1.0, RED);
        draw_circle_lines((p.x - origin.x) as f32 + 0.5, (p.y - origin.y) as f32 + 0.5, 3.0, 1.0, RED);
    };
    if let Some(p) = coll.left() {
        mark(p);
    }
    if let Some(p) = coll.right() {
        mark(p);
    }

    let row = |y: i32| {
        let sy = (y - origin.y) as f32 + 0.5;
        draw_line(px, sy, px + probe.w as f32, sy, 1.0, ORANGE);
    };
    if let Some(y) = coll.top() {
        row(y);
    }
    if let Some(y) = coll.bottom() {
        row(y);
    }
}

/// Keep the window open on the failure until the user closes it
async fn show_error(message: &str) {
    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        clear_background(Color::from_rgba(30, 30, 35, 255));
        draw_text(message, 10.0, 30.0, 20.0, RED);
        draw_text("press escape to quit", 10.0, 56.0, 20.0, GRAY);
        next_frame().await;
    }
}
