//! Ellipse geometry.

use kurbo::{Point, Rect};

/// An ellipse defined by its bounding box: top-left origin and size.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    /// Top-left corner of the bounding box in the local frame.
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl Ellipse {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Build from two corner points of the bounding box, resolving swapped
    /// corners to a non-negative width/height.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let min_x = p1.x.min(p2.x);
        let min_y = p1.y.min(p2.y);
        Self::new(
            Point::new(min_x, min_y),
            (p2.x - p1.x).abs(),
            (p2.y - p1.y).abs(),
        )
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }

    pub fn hit_test(&self, point: Point, tolerance: f64, stroke_width: f64, filled: bool) -> bool {
        let center = self.center();
        let rx = self.width / 2.0;
        let ry = self.height / 2.0;
        let half_sw = stroke_width / 2.0;

        let outer_rx = rx + tolerance + half_sw;
        let outer_ry = ry + tolerance + half_sw;
        if outer_rx < f64::EPSILON || outer_ry < f64::EPSILON {
            return false;
        }
        let dx_outer = (point.x - center.x) / outer_rx;
        let dy_outer = (point.y - center.y) / outer_ry;
        if dx_outer * dx_outer + dy_outer * dy_outer > 1.0 {
            return false;
        }
        if filled {
            return true;
        }
        // Outline only: reject points inside the inner ellipse
        let inner_rx = (rx - tolerance - half_sw).max(0.0);
        let inner_ry = (ry - tolerance - half_sw).max(0.0);
        if inner_rx < f64::EPSILON || inner_ry < f64::EPSILON {
            return true;
        }
        let dx_inner = (point.x - center.x) / inner_rx;
        let dy_inner = (point.y - center.y) / inner_ry;
        dx_inner * dx_inner + dy_inner * dy_inner > 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_bounds() {
        let e = Ellipse::new(Point::new(20.0, 30.0), 60.0, 40.0);
        let c = e.center();
        assert!((c.x - 50.0).abs() < f64::EPSILON);
        assert!((c.y - 50.0).abs() < f64::EPSILON);
        let b = e.bounds();
        assert!((b.x1 - 80.0).abs() < f64::EPSILON);
        assert!((b.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_corners_normalizes() {
        let e = Ellipse::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert!((e.origin.x - 10.0).abs() < f64::EPSILON);
        assert!((e.origin.y - 20.0).abs() < f64::EPSILON);
        assert!((e.width - 40.0).abs() < f64::EPSILON);
        assert!((e.height - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_outline_hit_test() {
        let e = Ellipse::new(Point::new(-10.0, -10.0), 20.0, 20.0);
        assert!(e.hit_test(Point::new(10.0, 0.0), 0.0, 2.0, false));
        assert!(!e.hit_test(Point::new(0.0, 0.0), 0.0, 2.0, false));
        assert!(!e.hit_test(Point::new(15.0, 0.0), 0.0, 2.0, false));
    }

    #[test]
    fn test_filled_hit_test_includes_center() {
        let e = Ellipse::new(Point::new(-10.0, -10.0), 20.0, 20.0);
        assert!(e.hit_test(Point::new(0.0, 0.0), 0.0, 2.0, true));
    }
}
