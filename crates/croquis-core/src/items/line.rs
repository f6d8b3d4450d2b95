//! Line segment geometry.

use kurbo::{Point, Rect, Vec2};

/// A single line segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.start.x.min(self.end.x),
            self.start.y.min(self.end.y),
            self.start.x.max(self.end.x),
            self.start.y.max(self.end.y),
        )
    }

    pub fn hit_test(&self, point: Point, tolerance: f64, stroke_width: f64) -> bool {
        let line_vec = Vec2::new(self.end.x - self.start.x, self.end.y - self.start.y);
        let point_vec = Vec2::new(point.x - self.start.x, point.y - self.start.y);

        let line_len_sq = line_vec.hypot2();
        if line_len_sq < f64::EPSILON {
            // Degenerate line is a point
            return point_vec.hypot() <= tolerance;
        }

        // Project point onto the segment, clamped
        let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
        let proj = Point::new(self.start.x + t * line_vec.x, self.start.y + t * line_vec.y);

        let dist = ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt();
        dist <= tolerance + stroke_width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!((line.length() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_on_line() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(50.0, 0.0), 1.0, 2.0));
        assert!(line.hit_test(Point::new(50.0, 2.0), 5.0, 2.0));
        assert!(!line.hit_test(Point::new(50.0, 20.0), 5.0, 2.0));
    }

    #[test]
    fn test_hit_test_endpoints() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(0.0, 0.0), 1.0, 2.0));
        assert!(line.hit_test(Point::new(100.0, 0.0), 1.0, 2.0));
    }

    #[test]
    fn test_bounds() {
        let line = Line::new(Point::new(50.0, 20.0), Point::new(10.0, 80.0));
        let bounds = line.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 80.0).abs() < f64::EPSILON);
    }
}
