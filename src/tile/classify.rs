//! Single-pass pixel classification
//!
//! One walk over the tile's pixels decides both representations. Uniform
//! tiles collapse to a color / a flag and never keep a per-pixel buffer.

use super::obstacle::{Obstacle, ObstacleMask};
use super::source::{TileError, TileImage};
use super::{CpuOnly, Tile, TileCoords, Visual};
use crate::render::Rgba;

/// Red channel values below this that are even mark an obstacle pixel
pub const OBSTACLE_THRESHOLD: u8 = 100;

/// Obstacle rule for a pixel's red channel
pub const fn is_obstacle(red: u8) -> bool {
    red < OBSTACLE_THRESHOLD && red % 2 == 0
}

/// Classify the top-left `tile_size * tile_size` pixels of an image
pub fn classify(
    coords: TileCoords,
    image: &TileImage,
    tile_size: u32,
) -> Result<Tile<CpuOnly>, TileError> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.rgba.len() != expected {
        return Err(TileError::BufferSize {
            coords,
            len: image.rgba.len(),
            expected,
        });
    }

    if image.width < tile_size || image.height < tile_size {
        return Err(TileError::TooSmall {
            coords,
            width: image.width,
            height: image.height,
            required: tile_size,
        });
    }

    let size = tile_size as usize;
    let stride = image.width as usize * 4;

    let mut pixels = Vec::with_capacity(size * size * 4);
    let mut mask = ObstacleMask::new(tile_size);

    let first = image.pixel(0, 0);
    let first_obstacle = is_obstacle(first[0]);
    let mut same_color = true;
    let mut same_obstacle = true;

    for y in 0..size {
        let row = &image.rgba[y * stride..y * stride + size * 4];
        for (x, px) in row.chunks_exact(4).enumerate() {
            pixels.extend_from_slice(px);

            let obstacle = is_obstacle(px[0]);
            if obstacle {
                mask.set(x as i32, y as i32, true);
            }

            same_color &= px == first;
            same_obstacle &= obstacle == first_obstacle;
        }
    }

    let visual = if same_color {
        Visual::Solid(Rgba::from_bytes(first))
    } else {
        Visual::Pixels(pixels)
    };

    let obstacle = match (same_obstacle, first_obstacle) {
        (true, true) => Obstacle::Full,
        (true, false) => Obstacle::None,
        (false, _) => Obstacle::Mask(mask),
    };

    Ok(Tile::from_parts(coords, tile_size, visual, obstacle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obstacle_rule() {
        assert!(is_obstacle(0));
        assert!(is_obstacle(2));
        assert!(is_obstacle(98));
        assert!(!is_obstacle(1));
        assert!(!is_obstacle(99));
        assert!(!is_obstacle(100));
        assert!(!is_obstacle(102));
        assert!(!is_obstacle(255));
    }

    #[test]
    fn test_uniform_obstacle_tile() {
        let image = TileImage::from_fn(8, |_, _| [0, 0, 0, 255]);
        let tile = classify(TileCoords::new(0, 0), &image, 8).unwrap();
        assert_eq!(tile.visual(), &Visual::Solid(Rgba::new(0, 0, 0, 255)));
        assert_eq!(tile.obstacle(), &Obstacle::Full);
    }

    #[test]
    fn test_uniform_obstacle_flag_with_varied_colors() {
        // Odd red values are all passable even though colors differ
        let image = TileImage::from_fn(8, |x, y| [(1 + 2 * x) as u8, y as u8, 0, 255]);
        let tile = classify(TileCoords::new(0, 0), &image, 8).unwrap();
        assert!(tile.needs_materialize());
        assert_eq!(tile.obstacle(), &Obstacle::None);
    }

    #[test]
    fn test_mixed_tile_builds_mask() {
        let image = TileImage::from_fn(8, |x, _| if x < 3 { [10, 0, 0, 255] } else { [255, 255, 255, 255] });
        let tile = classify(TileCoords::new(0, 0), &image, 8).unwrap();
        match tile.obstacle() {
            Obstacle::Mask(mask) => {
                assert_eq!(mask.count(), 3 * 8);
                assert!(mask.get(2, 7));
                assert!(!mask.get(3, 0));
            }
            other => panic!("expected mask, got {:?}", other),
        }
        match tile.visual() {
            Visual::Pixels(px) => assert_eq!(px.len(), 8 * 8 * 4),
            other => panic!("expected pixels, got {:?}", other),
        }
    }

    #[test]
    fn test_larger_image_uses_top_left_corner() {
        // 12x12 image, only the 8x8 corner matters
        let image = TileImage::from_fn(12, |x, y| if x >= 8 || y >= 8 { [0, 0, 0, 255] } else { [200, 0, 0, 255] });
        let tile = classify(TileCoords::new(0, 0), &image, 8).unwrap();
        assert_eq!(tile.visual(), &Visual::Solid(Rgba::new(200, 0, 0, 255)));
        assert_eq!(tile.obstacle(), &Obstacle::None);
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let image = TileImage { width: 8, height: 8, rgba: vec![0; 4] };
        let result = classify(TileCoords::new(3, 0), &image, 8);
        assert!(matches!(
            result,
            Err(TileError::BufferSize { len: 4, expected: 256, .. })
        ));
    }

    #[test]
    fn test_small_image_is_rejected() {
        let image = TileImage::from_fn(4, |_, _| [0, 0, 0, 255]);
        let result = classify(TileCoords::new(1, 2), &image, 8);
        assert!(matches!(
            result,
            Err(TileError::TooSmall { width: 4, height: 4, required: 8, .. })
        ));
    }
}
