//! World configuration
//!
//! A world is described by a small RON file next to (or pointing at) its
//! tile directory:
//!
//! ```ron
//! (
//!   data_dir: "tiles",
//!   tile_size: 512,
//!   cache_size: 64,
//!   precache_x: 512,
//!   precache_y: 512,
//!   start: (x: 256, y: 256),
//! )
//! ```
//!
//! Every field is optional. A relative `data_dir` is resolved against the
//! directory the file was loaded from.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::CacheConfig;
use crate::geometry::Point;

/// Largest tile edge accepted from a config file
pub const MAX_TILE_SIZE: u32 = 4096;

/// Ways reading or writing a `world.ron` can fail
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ValidationError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "cannot read or write world config: {}", e),
            ConfigError::ParseError(e) => write!(f, "world config is not valid RON: {}", e),
            ConfigError::SerializeError(e) => write!(f, "cannot encode world config: {}", e),
            ConfigError::ValidationError(msg) => write!(f, "bad world config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::ParseError(e) => Some(e),
            ConfigError::SerializeError(e) => Some(e),
            ConfigError::ValidationError(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Directory holding `<x>/<y>.png` tiles
    pub data_dir: PathBuf,
    pub tile_size: u32,
    /// Resident tile budget
    pub cache_size: usize,
    /// Horizontal prefetch margin around the view, in pixels
    pub precache_x: i32,
    /// Vertical prefetch margin around the view, in pixels
    pub precache_y: i32,
    /// Initial camera centre in world pixels
    pub start: Point,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let cache = CacheConfig::default();
        Self {
            data_dir: PathBuf::from("tiles"),
            tile_size: cache.tile_size,
            cache_size: cache.cache_size,
            precache_x: 512,
            precache_y: 512,
            start: Point::default(),
        }
    }
}

impl WorldConfig {
    /// Load and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_ron_str(&contents)?;

        if config.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data_dir = parent.join(&config.data_dir);
            }
        }
        Ok(config)
    }

    /// Parse and validate a config from RON text
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 || self.tile_size > MAX_TILE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "tile_size must be between 1 and {} (got {})",
                MAX_TILE_SIZE, self.tile_size
            )));
        }
        if self.precache_x < 0 || self.precache_y < 0 {
            return Err(ConfigError::ValidationError(format!(
                "precache margins must not be negative (got {}, {})",
                self.precache_x, self.precache_y
            )));
        }
        Ok(())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            tile_size: self.tile_size,
            cache_size: self.cache_size,
        }
    }
}
