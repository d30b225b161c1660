//! Tile asset sources
//!
//! A source maps tile coordinates to decoded images. A coordinate with no
//! backing image is air, reported as `Ok(None)`; only unreadable or
//! malformed assets are errors.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use image::{ColorType, ImageError, ImageFormat};

use super::TileCoords;

/// Tile loading error types
///
/// None of these are expected with correctly prepared assets.
#[derive(Debug)]
pub enum TileError {
    /// File exists but could not be read, or the loader thread failed to start
    Io { path: PathBuf, source: std::io::Error },
    /// File is not a decodable PNG
    Decode { path: PathBuf, source: ImageError },
    /// Image is smaller than one tile
    TooSmall { coords: TileCoords, width: u32, height: u32, required: u32 },
    /// Image is not 8 bits per channel
    Format { coords: TileCoords, color: ColorType },
    /// Pixel buffer length doesn't match the stated dimensions
    BufferSize { coords: TileCoords, len: usize, expected: usize },
    /// Tile size of zero
    ZeroTileSize,
    /// Loading the tile panicked on the loader thread
    LoaderPanic { coords: TileCoords },
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            TileError::Decode { path, source } => {
                write!(f, "failed to decode {}: {}", path.display(), source)
            }
            TileError::TooSmall { coords, width, height, required } => write!(
                f,
                "tile {} is {}x{}, expected at least {}x{}",
                coords, width, height, required, required
            ),
            TileError::Format { coords, color } => {
                write!(f, "tile {} has unsupported pixel format {:?}", coords, color)
            }
            TileError::BufferSize { coords, len, expected } => write!(
                f,
                "tile {} has {} bytes of pixel data, its size needs {}",
                coords, len, expected
            ),
            TileError::ZeroTileSize => write!(f, "tile size must be at least one pixel"),
            TileError::LoaderPanic { coords } => {
                write!(f, "loader thread panicked while loading tile {}", coords)
            }
        }
    }
}

impl std::error::Error for TileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TileError::Io { source, .. } => Some(source),
            TileError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Decoded tile image, RGBA 8 bits per channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TileImage {
    /// Build a `size * size` image from a per-pixel color function
    pub fn from_fn(size: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                rgba.extend_from_slice(&f(x, y));
            }
        }
        Self { width: size, height: size, rgba }
    }

    /// Decode PNG bytes
    ///
    /// Palette images come out of the decoder expanded to RGB(A), which is all
    /// classification needs: the obstacle rule reads the palette color.
    pub fn decode_png(bytes: &[u8], coords: TileCoords, path: &Path) -> Result<Self, TileError> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png).map_err(|source| {
            TileError::Decode {
                path: path.to_path_buf(),
                source,
            }
        })?;

        match img.color() {
            ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => {}
            color => return Err(TileError::Format { coords, color }),
        }

        let rgba = img.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }

    /// Color of one pixel
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [self.rgba[idx], self.rgba[idx + 1], self.rgba[idx + 2], self.rgba[idx + 3]]
    }
}

/// Where tile images come from
///
/// Shared with the background loader, so it must be thread-safe.
pub trait TileSource: Send + Sync {
    /// Image for a tile, `None` if the tile is air
    fn fetch(&self, coords: TileCoords) -> Result<Option<TileImage>, TileError>;
}

/// Tiles stored on disk as `<root>/<x>/<y>.png`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a tile's image, whether or not it exists
    pub fn tile_path(&self, coords: TileCoords) -> PathBuf {
        self.root
            .join(coords.x.to_string())
            .join(format!("{}.png", coords.y))
    }
}

impl TileSource for DirectorySource {
    fn fetch(&self, coords: TileCoords) -> Result<Option<TileImage>, TileError> {
        let path = self.tile_path(coords);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(TileError::Io { path, source }),
        };
        TileImage::decode_png(&bytes, coords, &path).map(Some)
    }
}

/// Tiles held in memory (embedded worlds, tests)
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tiles: HashMap<TileCoords, TileImage>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coords: TileCoords, image: TileImage) {
        self.tiles.insert(coords, image);
    }

    pub fn with_tile(mut self, coords: TileCoords, image: TileImage) -> Self {
        self.insert(coords, image);
        self
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileSource for MemorySource {
    fn fetch(&self, coords: TileCoords) -> Result<Option<TileImage>, TileError> {
        Ok(self.tiles.get(&coords).cloned())
    }
}
