//! World-to-tile addressing

use crate::geometry::{Point, Rect};

/// Signed division rounding toward negative infinity
///
/// `b` must be positive.
pub const fn floor_div(a: i32, b: i32) -> i32 {
    a.div_euclid(b)
}

/// Grid position of a tile in tile-space coordinates
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct TileCoords {
    pub x: i32,
    pub y: i32,
}

impl TileCoords {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing a world pixel
    pub fn containing(p: Point, tile_size: u32) -> Self {
        let size = tile_size as i32;
        Self::new(floor_div(p.x, size), floor_div(p.y, size))
    }

    /// World position of the tile's top-left pixel
    pub fn origin(&self, tile_size: u32) -> Point {
        let size = tile_size as i32;
        Point::new(self.x * size, self.y * size)
    }

    /// World rectangle covered by the tile
    pub fn rect(&self, tile_size: u32) -> Rect {
        let size = tile_size as i32;
        Rect::new(self.x * size, self.y * size, size, size)
    }
}

impl std::fmt::Display for TileCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Every tile whose rectangle intersects `rect`, column by column
pub fn tiles_in_rect(rect: Rect, tile_size: u32) -> impl Iterator<Item = TileCoords> {
    let (start, end) = if rect.is_empty() {
        // Start past the end so both ranges are empty
        (TileCoords::new(1, 1), TileCoords::new(0, 0))
    } else {
        (
            TileCoords::containing(rect.top_left(), tile_size),
            TileCoords::containing(Point::new(rect.last_x(), rect.last_y()), tile_size),
        )
    };
    (start.x..=end.x).flat_map(move |x| (start.y..=end.y).map(move |y| TileCoords::new(x, y)))
}
