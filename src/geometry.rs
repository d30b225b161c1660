//! Integer pixel geometry
//!
//! World space is addressed in whole pixels. A rectangle covers the pixels
//! `x..x + w` horizontally and `y..y + h` vertically; one with a
//! non-positive width or height covers nothing.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A pixel position in world or screen space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A rectangle defined by position and size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centered on a point
    pub fn centered(center: Point, w: i32, h: i32) -> Self {
        Self::new(center.x - w / 2, center.y - h / 2, w, h)
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// One past the right edge
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// One past the bottom edge
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Rightmost covered column
    pub fn last_x(&self) -> i32 {
        self.x + self.w - 1
    }

    /// Bottommost covered row
    pub fn last_y(&self) -> i32 {
        self.y + self.h - 1
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Check if point is inside
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Overlapping part of two rectangles, `None` if they don't overlap
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Grow by `dx` on the left and right and by `dy` on the top and bottom
    pub fn extend(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x - dx, self.y - dy, self.w + dx * 2, self.h + dy * 2)
    }

    /// Move by an offset
    pub fn offset(&self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y, self.w, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, -5, 10, 10);
        assert_eq!(a.intersection(&b), Some(Rect::new(5, 0, 5, 5)));

        // Touching edges don't overlap
        let c = Rect::new(10, 0, 5, 5);
        assert!(!a.intersects(&c));
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_empty_rect_never_intersects() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(!a.intersects(&Rect::new(2, 2, 0, 5)));
        assert!(!Rect::new(2, 2, 5, -1).intersects(&a));
    }

    #[test]
    fn test_extend_and_edges() {
        let r = Rect::new(10, 20, 30, 40).extend(5, 2);
        assert_eq!(r, Rect::new(5, 18, 40, 44));
        assert_eq!(r.last_x(), 44);
        assert_eq!(r.last_y(), 61);
        assert!(r.contains(Point::new(44, 61)));
        assert!(!r.contains(Point::new(45, 61)));
    }

    #[test]
    fn test_centered() {
        let r = Rect::centered(Point::new(100, 50), 20, 10);
        assert_eq!(r, Rect::new(90, 45, 20, 10));
        assert_eq!(r.center(), Point::new(100, 50));
    }
}
