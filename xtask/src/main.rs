//! Asset tasks for tilestream worlds
//!
//! Usage:
//!   cargo xtask demo-world --out world      # Paint a small demo world
//!   cargo xtask check-tiles world           # Validate every tile in a world

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tilestream::tile::{DirectorySource, LoadedTile, Obstacle, TileCoords, Visual};
use tilestream::{Point, WorldConfig};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Asset tasks for tilestream worlds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Paint a demo world of PNG tiles plus its world.ron
    DemoWorld {
        /// Output directory
        #[arg(long, default_value = "world")]
        out: PathBuf,
        /// World width in tiles
        #[arg(long, default_value_t = 16)]
        width: i32,
        /// World height in tiles
        #[arg(long, default_value_t = 6)]
        height: i32,
        /// Tile edge length in pixels
        #[arg(long, default_value_t = 256)]
        tile_size: u32,
    },
    /// Load every tile of a world and report how it was classified
    CheckTiles {
        /// World tile directory (holding <x>/<y>.png)
        dir: PathBuf,
        /// Tile edge length in pixels
        #[arg(long, default_value_t = 512)]
        tile_size: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::DemoWorld { out, width, height, tile_size } => demo_world(&out, width, height, tile_size),
        Commands::CheckTiles { dir, tile_size } => check_tiles(&dir, tile_size),
    }
}

/// Dirt: even red below 100, solid
const DIRT: [u8; 4] = [88, 58, 34, 255];
/// Grass: odd red, walkable decoration
const GRASS: [u8; 4] = [61, 140, 52, 255];
/// Rock outcrops: even red, solid
const ROCK: [u8; 4] = [70, 70, 76, 255];

/// Surface height in world pixels at column `x`
fn ground_level(x: i32, world_h: i32) -> i32 {
    let x = x as f32;
    let base = world_h as f32 * 0.55;
    let hills = (x / 180.0).sin() * 90.0 + (x / 47.0).sin() * 14.0;
    (base + hills) as i32
}

fn demo_pixel(x: i32, y: i32, world_h: i32) -> Option<[u8; 4]> {
    let ground = ground_level(x, world_h);
    if y < ground {
        // Floating ledges every so often
        let ledge = (x / 400) % 2 == 0 && (ground - 160..ground - 148).contains(&y) && x % 400 < 120;
        return ledge.then_some(ROCK);
    }
    if y < ground + 6 {
        Some(GRASS)
    } else {
        Some(DIRT)
    }
}

fn demo_world(out: &Path, width: i32, height: i32, tile_size: u32) -> Result<()> {
    if width <= 0 || height <= 0 || tile_size == 0 {
        anyhow::bail!("world dimensions and tile size must be positive");
    }

    let source = DirectorySource::new(out);
    let size = tile_size as i32;
    let world_h = height * size;

    let pb = ProgressBar::new((width * height) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Painting tiles [{bar:30}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );

    let mut written = 0;
    for tx in 0..width {
        for ty in 0..height {
            let coords = TileCoords::new(tx, ty);
            let origin = coords.origin(tile_size);

            let mut any = false;
            let img = RgbaImage::from_fn(tile_size, tile_size, |x, y| {
                match demo_pixel(origin.x + x as i32, origin.y + y as i32, world_h) {
                    Some(color) => {
                        any = true;
                        image::Rgba(color)
                    }
                    // Sky is transparent with an odd red channel
                    None => image::Rgba([1, 0, 0, 0]),
                }
            });

            // All-sky tiles are left out; a missing file is air
            if any {
                let path = source.tile_path(coords);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                img.save(&path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                written += 1;
            }
            pb.inc(1);
        }
    }
    pb.finish_with_message(format!("wrote {} tiles", written));

    let centre_x = width * size / 2;
    let config = WorldConfig {
        data_dir: PathBuf::from("."),
        tile_size,
        start: Point::new(centre_x, ground_level(centre_x, world_h) - 64),
        ..WorldConfig::default()
    };
    let config_path = out.join("world.ron");
    config
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("World written to {}", out.display());
    println!("  cargo run -- {}", config_path.display());
    Ok(())
}

#[derive(Default)]
struct TileCounts {
    solid: usize,
    pixels: usize,
    full: usize,
    passable: usize,
    masked: usize,
    mask_bits: usize,
}

/// Find `<x>/<y>.png` tiles under a directory
fn find_tiles(dir: &Path) -> Result<Vec<TileCoords>> {
    let mut tiles = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let column = entry?.path();
        let Some(x) = column.file_name().and_then(|n| n.to_str()).and_then(|n| n.parse::<i32>().ok()) else {
            continue;
        };
        if !column.is_dir() {
            continue;
        }
        for file in std::fs::read_dir(&column)? {
            let path = file?.path();
            if path.extension().map(|e| e == "png") != Some(true) {
                continue;
            }
            if let Some(y) = path.file_stem().and_then(|s| s.to_str()).and_then(|s| s.parse::<i32>().ok()) {
                tiles.push(TileCoords::new(x, y));
            }
        }
    }
    tiles.sort();
    Ok(tiles)
}

fn check_tiles(dir: &Path, tile_size: u32) -> Result<()> {
    let tiles = find_tiles(dir)?;
    let source = DirectorySource::new(dir);

    let pb = ProgressBar::new(tiles.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Checking tiles [{bar:30}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );

    let mut counts = TileCounts::default();
    let mut failures = Vec::new();
    for &coords in &tiles {
        match LoadedTile::load(&source, coords, tile_size) {
            Ok(tile) => {
                match tile.visual() {
                    Visual::Solid(_) => counts.solid += 1,
                    Visual::Pixels(_) => counts.pixels += 1,
                    Visual::Empty | Visual::Texture(_) => {}
                }
                match tile.obstacle() {
                    Obstacle::None => counts.passable += 1,
                    Obstacle::Full => counts.full += 1,
                    Obstacle::Mask(mask) => {
                        counts.masked += 1;
                        counts.mask_bits += mask.count();
                    }
                }
            }
            Err(e) => {
                pb.set_message(format!("Error: {}", e));
                failures.push(e);
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message(format!("checked {} tiles", tiles.len()));

    println!("visual:   {} solid color, {} textured", counts.solid, counts.pixels);
    println!(
        "obstacle: {} full, {} passable, {} masked ({} obstacle pixels)",
        counts.full, counts.passable, counts.masked, counts.mask_bits
    );

    if !failures.is_empty() {
        for e in &failures {
            eprintln!("  {}", e);
        }
        anyhow::bail!("{} of {} tiles failed to load", failures.len(), tiles.len());
    }
    Ok(())
}
