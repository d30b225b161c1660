//! World tiles
//!
//! A tile is one fixed-size square of the world. It keeps two independent,
//! content-dependent representations:
//!
//! - **Visual**: nothing, a flat color, a CPU pixel buffer, or an uploaded
//!   texture. Pixel buffers become textures exactly once, on the render
//!   thread (materialization).
//! - **Obstacle**: none, full, or a per-pixel mask, used for directional
//!   collision probes.
//!
//! Tiles built away from the render thread are `Tile<CpuOnly>`. `CpuOnly`
//! has no values, so such a tile can never hold a texture.

mod classify;
mod coords;
mod obstacle;
mod source;

pub use classify::{classify, is_obstacle, OBSTACLE_THRESHOLD};
pub use coords::{floor_div, tiles_in_rect, TileCoords};
pub use obstacle::{Obstacle, ObstacleMask};
pub use source::{DirectorySource, MemorySource, TileError, TileImage, TileSource};

use crate::collision::CollisionInfo;
use crate::geometry::{Point, Rect};
use crate::render::{Rgba, TileRenderer};

/// Texture type of tiles that haven't reached the render thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuOnly {}

/// A tile as produced by loading: CPU data only
pub type LoadedTile = Tile<CpuOnly>;

/// What a tile looks like
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visual<T> {
    /// Nothing to draw (no source image)
    Empty,
    /// Every pixel has this color
    Solid(Rgba),
    /// RGBA bytes waiting for upload
    Pixels(Vec<u8>),
    /// Uploaded to the renderer
    Texture(T),
}

#[derive(Debug)]
pub struct Tile<T> {
    coords: TileCoords,
    size: u32,
    visual: Visual<T>,
    obstacle: Obstacle,
}

impl<T> Tile<T> {
    pub(crate) fn from_parts(coords: TileCoords, size: u32, visual: Visual<T>, obstacle: Obstacle) -> Self {
        Self {
            coords,
            size,
            visual,
            obstacle,
        }
    }

    /// Air: invisible and passable
    pub fn empty(coords: TileCoords, size: u32) -> Self {
        Self::from_parts(coords, size, Visual::Empty, Obstacle::None)
    }

    pub fn coords(&self) -> TileCoords {
        self.coords
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// World rectangle covered by this tile
    pub fn rect(&self) -> Rect {
        self.coords.rect(self.size)
    }

    pub fn visual(&self) -> &Visual<T> {
        &self.visual
    }

    pub fn obstacle(&self) -> &Obstacle {
        &self.obstacle
    }

    /// Whether the tile still holds a CPU pixel buffer
    pub fn needs_materialize(&self) -> bool {
        matches!(self.visual, Visual::Pixels(_))
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self.visual, Visual::Texture(_))
    }

    /// Absent source: nothing to draw, nothing to collide with
    pub fn is_empty(&self) -> bool {
        matches!(self.visual, Visual::Empty) && self.obstacle == Obstacle::None
    }

    /// Upload the pixel buffer, once
    pub fn materialize<R>(&mut self, renderer: &mut R)
    where
        R: TileRenderer<Texture = T>,
    {
        if let Visual::Pixels(pixels) = &self.visual {
            let texture = renderer.upload(pixels, self.size);
            // Dropping the old visual frees the CPU copy
            self.visual = Visual::Texture(texture);
        }
    }

    /// Draw the tile if it overlaps `viewport`
    ///
    /// Pixel buffers that haven't been materialized draw nothing.
    pub fn render<R>(&self, renderer: &mut R, viewport: Rect)
    where
        R: TileRenderer<Texture = T>,
    {
        let rect = self.rect();
        if !rect.intersects(&viewport) {
            return;
        }

        let dest = rect.top_left() - viewport.top_left();
        match &self.visual {
            Visual::Empty | Visual::Pixels(_) => {}
            Visual::Solid(color) => {
                renderer.fill_rect(Rect::new(dest.x, dest.y, rect.w, rect.h), *color)
            }
            Visual::Texture(texture) => renderer.draw_texture(texture, dest),
        }
    }

    /// Clip a world probe to this tile, in tile-local pixels
    fn local_probe(&self, rect: Rect) -> Option<(Rect, Point)> {
        let tile_rect = self.rect();
        let origin = tile_rect.top_left();
        rect.intersection(&tile_rect)
            .map(|clipped| (clipped.offset(Point::new(-origin.x, -origin.y)), origin))
    }

    pub fn check_left_collision(&self, coll: &mut CollisionInfo, rect: Rect) {
        if let Some((local, origin)) = self.local_probe(rect) {
            self.obstacle.check_left(coll, local, origin);
        }
    }

    pub fn check_right_collision(&self, coll: &mut CollisionInfo, rect: Rect) {
        if let Some((local, origin)) = self.local_probe(rect) {
            self.obstacle.check_right(coll, local, origin);
        }
    }

    pub fn check_top_collision(&self, coll: &mut CollisionInfo, rect: Rect) {
        if let Some((local, origin)) = self.local_probe(rect) {
            self.obstacle.check_top(coll, local, origin);
        }
    }

    pub fn check_bottom_collision(&self, coll: &mut CollisionInfo, rect: Rect) {
        if let Some((local, origin)) = self.local_probe(rect) {
            self.obstacle.check_bottom(coll, local, origin);
        }
    }
}

impl Tile<CpuOnly> {
    /// Fetch and classify a tile
    ///
    /// A missing image gives an empty tile; a malformed one is an error.
    pub fn load(source: &dyn TileSource, coords: TileCoords, size: u32) -> Result<Self, TileError> {
        match source.fetch(coords)? {
            Some(image) => classify(coords, &image, size),
            None => Ok(Self::empty(coords, size)),
        }
    }

    /// Hand the tile to a renderer-aware owner
    pub fn into_renderable<T>(self) -> Tile<T> {
        let visual = match self.visual {
            Visual::Empty => Visual::Empty,
            Visual::Solid(color) => Visual::Solid(color),
            Visual::Pixels(pixels) => Visual::Pixels(pixels),
            Visual::Texture(never) => match never {},
        };
        Tile::from_parts(self.coords, self.size, visual, self.obstacle)
    }
}
