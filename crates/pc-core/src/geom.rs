use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle with exclusive right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    /// Builds a rectangle from inclusive pixel bounds, as produced by scanning
    /// the points of a traced curve.
    pub fn from_inclusive(min_x: usize, min_y: usize, max_x: usize, max_y: usize) -> Self {
        debug_assert!(min_x <= max_x && min_y <= max_y);
        Self {
            x: min_x,
            y: min_y,
            w: max_x - min_x + 1,
            h: max_y - min_y + 1,
        }
    }

    pub fn right(&self) -> usize {
        self.x + self.w
    }

    pub fn bottom(&self) -> usize {
        self.y + self.h
    }

    pub fn area(&self) -> usize {
        self.w * self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn intersection_area(&self, other: &Rect) -> usize {
        self.intersection(other).map_or(0, |r| r.area())
    }

    /// Clips the rectangle to a `width x height` canvas. The result may be
    /// empty but never inverted.
    pub fn clamp_to(&self, width: usize, height: usize) -> Rect {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.right().min(width).max(x0);
        let y1 = self.bottom().min(height).max(y0);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}
