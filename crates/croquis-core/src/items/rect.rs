//! Rectangle geometry.

use kurbo::{Point, Rect};

/// An axis-aligned rectangle defined by its top-left origin and size.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    /// Top-left corner in the local frame.
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Build from two corner points, resolving swapped corners to a
    /// non-negative width/height.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        Self::new(
            Point::new(min_x, min_y),
            (p2.x - p1.x).abs(),
            (p2.y - p1.y).abs(),
        )
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }

    pub fn bounds(&self) -> Rect {
        self.as_rect()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64, stroke_width: f64, filled: bool) -> bool {
        let rect = self.as_rect();
        if filled {
            // Filled: hit anywhere inside
            rect.inflate(tolerance, tolerance).contains(point)
        } else {
            // Outline only: hit on the border
            let pad = tolerance + stroke_width / 2.0;
            let outer = rect.inflate(pad, pad);
            let inner = rect.inflate(-pad, -pad);
            outer.contains(point) && !inner.contains(point)
        }
    }
}
