//! Core geometry types in CSS pixels: Point, Region.

/// A position in surface coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An axis-aligned box: origin plus size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open containment: the right and bottom edges are outside.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    #[inline]
    pub fn intersects(&self, other: &Region) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// This region moved by the origin of `parent`.
    #[inline]
    pub fn offset_by(&self, parent: &Region) -> Region {
        Region::new(self.x + parent.x, self.y + parent.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_half_open() {
        let r = Region::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(29.9, 14.9)));
        assert!(!r.contains(Point::new(30.0, 12.0)));
        assert!(!r.contains(Point::new(15.0, 15.0)));
    }

    #[test]
    fn intersection() {
        let a = Region::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Region::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Region::new(10.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn offset_and_distance() {
        let child = Region::new(4.0, 6.0, 1.0, 1.0);
        let moved = child.offset_by(&Region::new(100.0, 200.0, 0.0, 0.0));
        assert_eq!(moved, Region::new(104.0, 206.0, 1.0, 1.0));
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
        assert!(Region::new(0.0, 0.0, 0.0, 5.0).is_empty());
    }
}
