//! Collision accumulator
//!
//! Collects, across any number of tiles, the single nearest blocking
//! coordinate on each side of a query rectangle. A candidate replaces the
//! stored value only when it is strictly nearer:
//!
//! - left: larger x, then larger y
//! - right: smaller x, then larger y
//! - top: larger y
//! - bottom: smaller y
//!
//! Left and right both break ties toward the bottommost pixel, which the
//! movement code reads as step height.

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionInfo {
    left: Option<Point>,
    right: Option<Point>,
    top: Option<i32>,
    bottom: Option<i32>,
}

impl CollisionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_left(&mut self, p: Point) {
        let nearer = match self.left {
            None => true,
            Some(cur) => p.x > cur.x || (p.x == cur.x && p.y > cur.y),
        };
        if nearer {
            self.left = Some(p);
        }
    }

    pub fn add_right(&mut self, p: Point) {
        let nearer = match self.right {
            None => true,
            Some(cur) => p.x < cur.x || (p.x == cur.x && p.y > cur.y),
        };
        if nearer {
            self.right = Some(p);
        }
    }

    pub fn add_top(&mut self, y: i32) {
        if self.top.map_or(true, |cur| y > cur) {
            self.top = Some(y);
        }
    }

    pub fn add_bottom(&mut self, y: i32) {
        if self.bottom.map_or(true, |cur| y < cur) {
            self.bottom = Some(y);
        }
    }

    /// Fold another accumulator into this one
    pub fn merge(&mut self, other: &CollisionInfo) {
        if let Some(p) = other.left {
            self.add_left(p);
        }
        if let Some(p) = other.right {
            self.add_right(p);
        }
        if let Some(y) = other.top {
            self.add_top(y);
        }
        if let Some(y) = other.bottom {
            self.add_bottom(y);
        }
    }

    pub fn left(&self) -> Option<Point> {
        self.left
    }

    pub fn right(&self) -> Option<Point> {
        self.right
    }

    pub fn top(&self) -> Option<i32> {
        self.top
    }

    pub fn bottom(&self) -> Option<i32> {
        self.bottom
    }

    pub fn has_left(&self) -> bool {
        self.left.is_some()
    }

    pub fn has_right(&self) -> bool {
        self.right.is_some()
    }

    pub fn has_top(&self) -> bool {
        self.top.is_some()
    }

    pub fn has_bottom(&self) -> bool {
        self.bottom.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_tie_break() {
        let mut coll = CollisionInfo::new();
        coll.add_left(Point::new(10, 5));
        coll.add_left(Point::new(9, 50));
        assert_eq!(coll.left(), Some(Point::new(10, 5)));
        coll.add_left(Point::new(10, 6));
        assert_eq!(coll.left(), Some(Point::new(10, 6)));
        coll.add_left(Point::new(10, 6));
        assert_eq!(coll.left(), Some(Point::new(10, 6)));
    }

    #[test]
    fn test_right_tie_break() {
        let mut coll = CollisionInfo::new();
        coll.add_right(Point::new(10, 5));
        coll.add_right(Point::new(11, 50));
        assert_eq!(coll.right(), Some(Point::new(10, 5)));
        coll.add_right(Point::new(10, 8));
        assert_eq!(coll.right(), Some(Point::new(10, 8)));
        coll.add_right(Point::new(3, -100));
        assert_eq!(coll.right(), Some(Point::new(3, -100)));
    }

    #[test]
    fn test_top_and_bottom() {
        let mut coll = CollisionInfo::new();
        coll.add_top(-4);
        coll.add_top(-10);
        coll.add_bottom(40);
        coll.add_bottom(30);
        assert_eq!(coll.top(), Some(-4));
        assert_eq!(coll.bottom(), Some(30));
        assert!(!coll.has_left());
        assert!(!coll.has_right());
    }

    #[test]
    fn test_merge_is_order_independent() {
        let offers = [
            (Point::new(3, 1), Point::new(20, 1), 5, 50),
            (Point::new(7, 0), Point::new(20, 9), 2, 60),
            (Point::new(7, 4), Point::new(25, 0), 9, 45),
        ];

        let build = |order: &[usize]| {
            let mut total = CollisionInfo::new();
            for &i in order {
                let (l, r, t, b) = offers[i];
                let mut part = CollisionInfo::new();
                part.add_left(l);
                part.add_right(r);
                part.add_top(t);
                part.add_bottom(b);
                total.merge(&part);
            }
            total
        };

        let a = build(&[0, 1, 2]);
        let b = build(&[2, 0, 1]);
        let c = build(&[1, 2, 0]);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.left(), Some(Point::new(7, 4)));
        assert_eq!(a.right(), Some(Point::new(20, 9)));
        assert_eq!(a.top(), Some(9));
        assert_eq!(a.bottom(), Some(45));
    }
}
