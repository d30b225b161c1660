//! Obstacle representation and directional collision scans
//!
//! Checks receive the probe rectangle already clipped to the tile and
//! expressed in tile-local pixels, plus the tile's world origin to turn hits
//! back into world coordinates.

use crate::collision::CollisionInfo;
use crate::geometry::{Point, Rect};

/// Per-pixel blocking flags, one bit per pixel, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleMask {
    size: u32,
    bits: Vec<u64>,
}

impl ObstacleMask {
    pub fn new(size: u32) -> Self {
        let count = (size as usize * size as usize).div_ceil(64);
        Self { size, bits: vec![0; count] }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.size as usize + x as usize
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        let i = self.index(x, y);
        self.bits[i / 64] & (1 << (i % 64)) != 0
    }

    pub fn set(&mut self, x: i32, y: i32, blocked: bool) {
        let i = self.index(x, y);
        if blocked {
            self.bits[i / 64] |= 1 << (i % 64);
        } else {
            self.bits[i / 64] &= !(1 << (i % 64));
        }
    }

    /// Number of blocking pixels
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }
}

/// How a tile blocks movement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Obstacle {
    /// Every pixel passable
    None,
    /// Every pixel blocking
    Full,
    /// Mixed
    Mask(ObstacleMask),
}

impl Obstacle {
    /// Nearest blocking pixel for a probe left of an actor:
    /// rightmost column, bottommost pixel in it
    pub fn check_left(&self, coll: &mut CollisionInfo, local: Rect, origin: Point) {
        match self {
            Obstacle::None => {}
            Obstacle::Full => coll.add_left(Point::new(local.last_x(), local.last_y()) + origin),
            Obstacle::Mask(mask) => {
                // Scan from the side nearest the actor and stop at the first
                // hit; pixels farther away can't win
                for x in (local.x..=local.last_x()).rev() {
                    for y in (local.y..=local.last_y()).rev() {
                        if mask.get(x, y) {
                            coll.add_left(Point::new(x, y) + origin);
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Leftmost column, bottommost pixel in it
    pub fn check_right(&self, coll: &mut CollisionInfo, local: Rect, origin: Point) {
        match self {
            Obstacle::None => {}
            Obstacle::Full => coll.add_right(Point::new(local.x, local.last_y()) + origin),
            Obstacle::Mask(mask) => {
                for x in local.x..=local.last_x() {
                    for y in (local.y..=local.last_y()).rev() {
                        if mask.get(x, y) {
                            coll.add_right(Point::new(x, y) + origin);
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Bottommost row containing a blocking pixel
    pub fn check_top(&self, coll: &mut CollisionInfo, local: Rect, origin: Point) {
        match self {
            Obstacle::None => {}
            Obstacle::Full => coll.add_top(local.last_y() + origin.y),
            Obstacle::Mask(mask) => {
                for y in (local.y..=local.last_y()).rev() {
                    if (local.x..=local.last_x()).any(|x| mask.get(x, y)) {
                        coll.add_top(y + origin.y);
                        return;
                    }
                }
            }
        }
    }

    /// Topmost row containing a blocking pixel
    pub fn check_bottom(&self, coll: &mut CollisionInfo, local: Rect, origin: Point) {
        match self {
            Obstacle::None => {}
            Obstacle::Full => coll.add_bottom(local.y + origin.y),
            Obstacle::Mask(mask) => {
                for y in local.y..=local.last_y() {
                    if (local.x..=local.last_x()).any(|x| mask.get(x, y)) {
                        coll.add_bottom(y + origin.y);
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(size: u32, blocked: &[(i32, i32)]) -> Obstacle {
        let mut mask = ObstacleMask::new(size);
        for &(x, y) in blocked {
            mask.set(x, y, true);
        }
        Obstacle::Mask(mask)
    }

    #[test]
    fn test_mask_bits() {
        let mut mask = ObstacleMask::new(10);
        mask.set(9, 9, true);
        mask.set(3, 6, true);
        assert!(mask.get(9, 9));
        assert!(mask.get(3, 6));
        assert!(!mask.get(6, 3));
        assert_eq!(mask.count(), 2);
        mask.set(9, 9, false);
        assert!(!mask.get(9, 9));
    }

    #[test]
    fn test_left_prefers_rightmost_then_bottommost() {
        let obstacle = mask_with(16, &[(2, 2), (5, 3), (5, 9), (5, 12), (1, 15)]);
        let mut coll = CollisionInfo::new();
        obstacle.check_left(&mut coll, Rect::new(0, 0, 16, 12), Point::new(100, 200));
        // (5, 12) is outside the probe rows
        assert_eq!(coll.left(), Some(Point::new(105, 209)));
    }

    #[test]
    fn test_right_prefers_leftmost_then_bottommost() {
        let obstacle = mask_with(16, &[(9, 1), (4, 2), (4, 7), (2, 14)]);
        let mut coll = CollisionInfo::new();
        obstacle.check_right(&mut coll, Rect::new(3, 0, 10, 10), Point::new(0, 0));
        // (2, 14) is outside the probe
        assert_eq!(coll.right(), Some(Point::new(4, 7)));
    }

    #[test]
    fn test_top_and_bottom_rows() {
        let obstacle = mask_with(16, &[(3, 2), (8, 6), (0, 10)]);

        let mut coll = CollisionInfo::new();
        obstacle.check_top(&mut coll, Rect::new(1, 0, 10, 8), Point::new(0, -16));
        assert_eq!(coll.top(), Some(6 - 16));

        let mut coll = CollisionInfo::new();
        obstacle.check_bottom(&mut coll, Rect::new(1, 0, 10, 16), Point::new(0, -16));
        assert_eq!(coll.bottom(), Some(2 - 16));
    }

    #[test]
    fn test_full_reports_probe_edges() {
        let local = Rect::new(2, 3, 4, 5);
        let origin = Point::new(32, 64);
        let mut coll = CollisionInfo::new();
        Obstacle::Full.check_left(&mut coll, local, origin);
        Obstacle::Full.check_right(&mut coll, local, origin);
        Obstacle::Full.check_top(&mut coll, local, origin);
        Obstacle::Full.check_bottom(&mut coll, local, origin);

        assert_eq!(coll.left(), Some(Point::new(37, 71)));
        assert_eq!(coll.right(), Some(Point::new(34, 71)));
        assert_eq!(coll.top(), Some(71));
        assert_eq!(coll.bottom(), Some(67));
    }

    #[test]
    fn test_none_reports_nothing() {
        let mut coll = CollisionInfo::new();
        let local = Rect::new(0, 0, 8, 8);
        Obstacle::None.check_left(&mut coll, local, Point::default());
        Obstacle::None.check_bottom(&mut coll, local, Point::default());
        assert_eq!(coll, CollisionInfo::new());
    }
}
