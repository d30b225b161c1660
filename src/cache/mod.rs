//! Streaming tile cache
//!
//! `TileCache` keeps a bounded working set of tiles around the camera. Each
//! frame the caller hands it the view rectangle:
//!
//! - tiles in the view are made resident immediately (blocking if needed)
//!   and uploaded to the renderer,
//! - tiles in a halo around the view are queued for the background loader,
//! - finished background loads are moved into the resident map,
//! - the least recently used tiles outside the view are evicted.
//!
//! The resident map is only reachable through `&mut self`, so the loader
//! thread never touches it; loaded tiles cross over as plain CPU data.

mod loader;
mod lru;

pub use lru::LruOrder;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::collision::CollisionInfo;
use crate::geometry::{Point, Rect};
use crate::render::TileRenderer;
use crate::tile::{tiles_in_rect, LoadedTile, Tile, TileCoords, TileError, TileSource};

use loader::Loader;

/// Cache sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Resident tile budget enforced by `update_cache`
    pub cache_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            tile_size: 512,
            cache_size: 64,
        }
    }
}

/// Snapshot of what the cache holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub resident: usize,
    pub materialized: usize,
    pub queued: usize,
    pub loading: bool,
}

pub struct TileCache<R: TileRenderer> {
    renderer: R,
    source: Arc<dyn TileSource>,
    tile_size: u32,
    cache_size: usize,
    tiles: HashMap<TileCoords, Tile<R::Texture>>,
    lru: LruOrder,
    loader: Loader,
}

impl<R: TileRenderer> TileCache<R> {
    /// Create an empty cache and start its loader thread
    pub fn new(renderer: R, source: Arc<dyn TileSource>, config: CacheConfig) -> Result<Self, TileError> {
        if config.tile_size == 0 {
            return Err(TileError::ZeroTileSize);
        }
        let loader = Loader::spawn(Arc::clone(&source), config.tile_size).map_err(|source| TileError::Io {
            path: PathBuf::new(),
            source,
        })?;

        Ok(Self {
            renderer,
            source,
            tile_size: config.tile_size,
            cache_size: config.cache_size,
            tiles: HashMap::new(),
            lru: LruOrder::new(),
            loader,
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    /// Change the resident budget; applied by the next `update_cache`
    pub fn set_cache_size(&mut self, cache_size: usize) {
        self.cache_size = cache_size;
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn resident_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_resident(&self, coords: TileCoords) -> bool {
        self.tiles.contains_key(&coords)
    }

    pub fn tile(&self, coords: TileCoords) -> Option<&Tile<R::Texture>> {
        self.tiles.get(&coords)
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.loader.lock();
        CacheStats {
            resident: self.tiles.len(),
            materialized: self.tiles.values().filter(|t| t.is_materialized()).count(),
            queued: state.queue.len(),
            loading: state.loading.is_some(),
        }
    }

    /// Load every missing tile in `rect` on the calling thread
    ///
    /// Returns how many tiles were loaded.
    pub fn preload_sync(&mut self, rect: Rect) -> Result<usize, TileError> {
        self.preload_sync_with_progress(rect, |_, _| {})
    }

    /// Like `preload_sync`, calling `progress(done, total)` after each tile
    pub fn preload_sync_with_progress(
        &mut self,
        rect: Rect,
        mut progress: impl FnMut(usize, usize),
    ) -> Result<usize, TileError> {
        let missing: Vec<TileCoords> = tiles_in_rect(rect, self.tile_size)
            .filter(|c| !self.tiles.contains_key(c))
            .collect();

        let total = missing.len();
        for (i, coords) in missing.into_iter().enumerate() {
            self.ensure_resident(coords)?;
            progress(i + 1, total);
        }

        log::info!("preloaded {} tiles", total);
        Ok(total)
    }

    /// Per-frame cache maintenance for the given view
    pub fn update_cache(&mut self, view: Rect, precache_x: i32, precache_y: i32) -> Result<(), TileError> {
        self.drain_loaded()?;

        let view_tiles: Vec<TileCoords> = tiles_in_rect(view, self.tile_size).collect();
        for &coords in &view_tiles {
            if !self.tiles.contains_key(&coords) {
                log::debug!("tile {} entered the view unloaded, loading synchronously", coords);
            }
            self.ensure_resident(coords)?;
            if let Some(tile) = self.tiles.get_mut(&coords) {
                tile.materialize(&mut self.renderer);
            }
        }

        let halo = view.extend(precache_x, precache_y);
        let center = view.center();
        self.rebuild_queue(halo, center);
        self.materialize_nearest(halo, view, center);
        self.loader.notify();

        for &coords in &view_tiles {
            self.lru.touch(coords);
        }

        self.evict(view);
        Ok(())
    }

    /// Draw every resident tile overlapping `view`
    pub fn render(&mut self, view: Rect) {
        for coords in tiles_in_rect(view, self.tile_size) {
            if let Some(tile) = self.tiles.get(&coords) {
                tile.render(&mut self.renderer, view);
            }
        }
    }

    /// Probe the four strips of width `distance` around `rect`
    ///
    /// Every tile under the probes is loaded first, blocking if needed.
    pub fn update_collisions(
        &mut self,
        coll: &mut CollisionInfo,
        rect: Rect,
        distance: i32,
    ) -> Result<(), TileError> {
        let left = Rect::new(rect.x - distance, rect.y, distance, rect.h);
        let right = Rect::new(rect.right(), rect.y, distance, rect.h);
        let top = Rect::new(rect.x, rect.y - distance, rect.w, distance);
        let bottom = Rect::new(rect.x, rect.bottom(), rect.w, distance);

        for coords in tiles_in_rect(rect.extend(distance, distance), self.tile_size) {
            self.ensure_resident(coords)?;
            if let Some(tile) = self.tiles.get(&coords) {
                tile.check_left_collision(coll, left);
                tile.check_right_collision(coll, right);
                tile.check_top_collision(coll, top);
                tile.check_bottom_collision(coll, bottom);
            }
        }
        Ok(())
    }

    /// Move finished background loads into the resident map
    fn drain_loaded(&mut self) -> Result<(), TileError> {
        let loaded = std::mem::take(&mut self.loader.lock().loaded);

        let mut first_error = None;
        for (coords, result) in loaded {
            match result {
                Ok(_) if self.tiles.contains_key(&coords) => {
                    log::trace!("dropping duplicate load of tile {}", coords);
                }
                Ok(tile) => self.insert(tile),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Replace the loader's queue with the halo's missing tiles, nearest first
    fn rebuild_queue(&mut self, halo: Rect, center: Point) {
        let tile_size = self.tile_size;
        let mut state = self.loader.lock();
        let mut wanted: Vec<TileCoords> = tiles_in_rect(halo, tile_size)
            .filter(|c| !self.tiles.contains_key(c))
            .filter(|c| state.loading != Some(*c) && !state.is_loaded(*c))
            .collect();
        wanted.sort_by_key(|c| distance_sq(c.rect(tile_size).center(), center));

        state.queue.clear();
        state.queue.extend(wanted);
    }

    /// Upload one halo tile per frame, the one closest to the view centre
    fn materialize_nearest(&mut self, halo: Rect, view: Rect, center: Point) {
        let tile_size = self.tile_size;
        let nearest = tiles_in_rect(halo, tile_size)
            .filter(|c| !c.rect(tile_size).intersects(&view))
            .filter(|c| self.tiles.get(c).is_some_and(|t| t.needs_materialize()))
            .min_by_key(|c| distance_sq(c.rect(tile_size).center(), center));

        if let Some(tile) = nearest.and_then(|c| self.tiles.get_mut(&c)) {
            tile.materialize(&mut self.renderer);
        }
    }

    /// Drop least recently used tiles until within budget
    ///
    /// Stops early rather than evict a tile the view still covers.
    fn evict(&mut self, view: Rect) {
        while self.tiles.len() > self.cache_size {
            let Some(oldest) = self.lru.oldest() else {
                break;
            };
            if oldest.rect(self.tile_size).intersects(&view) {
                break;
            }
            self.lru.remove(oldest);
            self.tiles.remove(&oldest);
            log::trace!("evicted tile {}", oldest);
        }
    }

    /// Make a tile resident, waiting for or bypassing the loader
    fn ensure_resident(&mut self, coords: TileCoords) -> Result<(), TileError> {
        if self.tiles.contains_key(&coords) {
            return Ok(());
        }

        let finished = {
            let mut state = self.loader.lock();
            if state.loading == Some(coords) {
                log::debug!("waiting for background load of tile {}", coords);
                state = self.loader.wait_for(state, coords);
            }
            let finished = state.take_loaded(coords);
            if finished.is_none() {
                state.queue.retain(|c| *c != coords);
            }
            finished
        };

        let tile = match finished {
            Some(result) => result?,
            None => LoadedTile::load(self.source.as_ref(), coords, self.tile_size)?,
        };
        self.insert(tile);
        Ok(())
    }

    fn insert(&mut self, tile: LoadedTile) {
        let coords = tile.coords();
        self.tiles.insert(coords, tile.into_renderable());
        self.lru.touch(coords);
    }
}

fn distance_sq(a: Point, b: Point) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}
