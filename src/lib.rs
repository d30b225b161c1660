//! tilestream: streaming tile worlds for 2D games
//!
//! Very large pixel-painted levels are cut into square PNG tiles. This crate
//! keeps a bounded working set of them in memory around the camera, loads
//! the ones just outside the view on a background thread, draws what is
//! visible, and answers pixel-exact collision probes for a rectangular
//! actor.
//!
//! - [`tile`]: tile addressing, asset sources, per-tile representations
//! - [`cache`]: the streaming [`TileCache`](cache::TileCache)
//! - [`collision`]: [`CollisionInfo`](collision::CollisionInfo) accumulator
//! - [`render`]: renderer trait plus macroquad and software backends
//! - [`config`]: RON world description

pub mod cache;
pub mod collision;
pub mod config;
pub mod geometry;
pub mod render;
pub mod tile;

pub use cache::{CacheConfig, CacheStats, TileCache};
pub use collision::CollisionInfo;
pub use config::{ConfigError, WorldConfig};
pub use geometry::{Point, Rect};
pub use render::{Framebuffer, QuadRenderer, Rgba, TileRenderer};
pub use tile::{DirectorySource, MemorySource, Tile, TileCoords, TileError, TileSource};

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
