use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen space (+y is down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn set_left(&mut self, x: f32) {
        self.min.x = x;
    }

    pub fn set_right(&mut self, x: f32) {
        self.min.x = x - self.size.x;
    }

    pub fn set_top(&mut self, y: f32) {
        self.min.y = y;
    }

    pub fn set_bottom(&mut self, y: f32) {
        self.min.y = y - self.size.y;
    }

    /// Copy of this rect moved by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            size: self.size,
        }
    }

    /// Strict overlap: rects that only share an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 32.0, 32.0);
        let b = Rect::new(32.0, 0.0, 32.0, 32.0);
        assert!(!a.overlaps(&b));
        assert!(a.translated(Vec2::new(1.0, 0.0)).overlaps(&b));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut r = Rect::new(10.0, 10.0, 32.0, 16.0);
        r.set_right(100.0);
        r.set_bottom(50.0);
        assert_eq!(r.min, Vec2::new(68.0, 34.0));
        assert_eq!(r.size, Vec2::new(32.0, 16.0));
    }
}
