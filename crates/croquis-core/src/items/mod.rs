//! Item model for the scene editor.

mod ellipse;
mod freehand;
mod line;
mod polygon;
mod rect;

pub use ellipse::Ellipse;
pub use freehand::Freehand;
pub use line::Line;
pub use polygon::Polygon;
pub use rect::Rectangle;

use kurbo::{Point, Rect, Vec2};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Format as `#rrggbb`. Alpha is not part of the wire format; a fully
    /// transparent fill is encoded as the `"none"` sentinel instead.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse a hex color string (`#rgb`, `#rrggbb`, `#rrggbbaa`).
    /// Anything unparseable falls back to black.
    pub fn parse(color: &str) -> Self {
        if let Some(hex) = color.strip_prefix('#') {
            let hex = hex.trim();
            if !hex.is_ascii() {
                return Self::black();
            }
            match hex.len() {
                3 => {
                    let r = u8::from_str_radix(&hex[0..1], 16).unwrap_or(0) * 17;
                    let g = u8::from_str_radix(&hex[1..2], 16).unwrap_or(0) * 17;
                    let b = u8::from_str_radix(&hex[2..3], 16).unwrap_or(0) * 17;
                    return Self::new(r, g, b, 255);
                }
                6 => {
                    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                    return Self::new(r, g, b, 255);
                }
                8 => {
                    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                    let a = u8::from_str_radix(&hex[6..8], 16).unwrap_or(255);
                    return Self::new(r, g, b, a);
                }
                _ => {}
            }
        }
        Self::black()
    }
}

/// Stroke and fill properties applied to an item at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
}

impl ItemStyle {
    /// A fill counts only if a brush is present and not fully transparent.
    pub fn has_fill(&self) -> bool {
        self.fill_color.is_some_and(|c| !c.is_transparent())
    }
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
        }
    }
}

/// Unique identifier for items.
pub type ItemId = Uuid;

/// Distance from a point to a line segment (a->b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Closed set of drawable geometries. Geometry is always expressed in the
/// item's local frame; the owning [`Item`]'s `position` is the only
/// translation applied on top.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemShape {
    Freehand(Freehand),
    Line(Line),
    Rect(Rectangle),
    Ellipse(Ellipse),
    Polygon(Polygon),
}

impl ItemShape {
    /// Stable name of the variant, used for notifications and event logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ItemShape::Freehand(_) => "Freehand",
            ItemShape::Line(_) => "Line",
            ItemShape::Rect(_) => "Rect",
            ItemShape::Ellipse(_) => "Ellipse",
            ItemShape::Polygon(_) => "Polygon",
        }
    }

    /// Bounding box in the local frame.
    pub fn bounds(&self) -> Rect {
        match self {
            ItemShape::Freehand(s) => s.bounds(),
            ItemShape::Line(s) => s.bounds(),
            ItemShape::Rect(s) => s.bounds(),
            ItemShape::Ellipse(s) => s.bounds(),
            ItemShape::Polygon(s) => s.bounds(),
        }
    }

    /// Hit test against a point in the local frame.
    pub fn hit_test(&self, point: Point, tolerance: f64, style: &ItemStyle) -> bool {
        let sw = style.stroke_width;
        let filled = style.has_fill();
        match self {
            ItemShape::Freehand(s) => s.hit_test(point, tolerance, sw),
            ItemShape::Line(s) => s.hit_test(point, tolerance, sw),
            ItemShape::Rect(s) => s.hit_test(point, tolerance, sw, filled),
            ItemShape::Ellipse(s) => s.hit_test(point, tolerance, sw, filled),
            ItemShape::Polygon(s) => s.hit_test(point, tolerance, sw, filled),
        }
    }
}

/// A drawable entity owned by the scene's live item set.
#[derive(Debug, Clone)]
pub struct Item {
    pub(crate) id: ItemId,
    /// Variant geometry, in the item's local frame.
    pub shape: ItemShape,
    /// Translation offset applied on top of the local geometry.
    pub position: Point,
    /// Stroke/fill properties.
    pub style: ItemStyle,
    /// Stacking order (insertion order by default).
    pub z: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    pub opacity: f64,
    pub selectable: bool,
    pub movable: bool,
    pub enabled: bool,
    /// Opaque provenance tag (e.g. marks assistant-generated parts).
    pub tag: Option<String>,
}

impl Item {
    /// Create an item with default attributes at the origin.
    pub fn new(shape: ItemShape) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape,
            position: Point::ZERO,
            style: ItemStyle::default(),
            z: 0.0,
            opacity: 1.0,
            selectable: true,
            movable: true,
            enabled: true,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind_name(&self) -> &'static str {
        self.shape.kind_name()
    }

    /// Bounding box in scene coordinates.
    pub fn bounds(&self) -> Rect {
        self.shape.bounds() + self.position.to_vec2()
    }

    /// Check if a point (in scene coordinates) hits this item.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = point - self.position.to_vec2();
        self.shape.hit_test(local, tolerance, &self.style)
    }
}
