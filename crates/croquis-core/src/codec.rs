//! Structural serialization of items.
//!
//! One record format backs the clipboard, duplication, and the template
//! store. Encoding an unsupported item and decoding an unknown or
//! incomplete record both yield `None`; neither is an error.

use crate::items::{
    Ellipse, Freehand, Item, ItemShape, ItemStyle, Line, Polygon, Rectangle, SerializableColor,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Sentinel used for an absent fill.
pub const FILL_NONE: &str = "none";

/// Marker on the first element of a freehand path.
pub const PATH_START: &str = "start";
/// Marker on every subsequent freehand path element.
pub const PATH_LINE: &str = "line";

/// One polyline element: `[x, y, marker]`.
pub type PathElement = (f64, f64, String);

fn default_stroke() -> String {
    "#000000".to_string()
}

fn default_stroke_width() -> f64 {
    1.0
}

fn default_fill() -> String {
    FILL_NONE.to_string()
}

/// The structural, JSON-compatible encoding of one item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pos: [f64; 2],
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(rename = "strokeWidth", default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "default_fill")]
    pub fill: String,
    #[serde(default)]
    pub z: f64,
    /// Line endpoints as `[x1, y1, x2, y2]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<[f64; 4]>,
    /// Rect bounding box as `[x, y, w, h]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<[f64; 4]>,
    /// Ellipse bounding box as `[x, y, w, h]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ellipse: Option<[f64; 4]>,
    /// Freehand polyline; the first element carries the start marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathElement>>,
    /// Polygon vertices as `[x, y]` pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<[f64; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Clipboard envelope: `{"items": [record, ...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub items: Vec<SerializedRecord>,
}

/// Encode an item into a record, or `None` for unsupported kinds.
pub fn encode(item: &Item) -> Option<SerializedRecord> {
    let fill = match item.style.fill_color {
        Some(c) if !c.is_transparent() => c.to_hex(),
        _ => FILL_NONE.to_string(),
    };
    let mut record = SerializedRecord {
        kind: item.kind_name().to_string(),
        pos: [item.position.x, item.position.y],
        stroke: item.style.stroke_color.to_hex(),
        stroke_width: item.style.stroke_width,
        fill,
        z: item.z,
        line: None,
        rect: None,
        ellipse: None,
        path: None,
        polygon: None,
        tag: item.tag.clone(),
    };

    match &item.shape {
        ItemShape::Line(l) => {
            record.line = Some([l.start.x, l.start.y, l.end.x, l.end.y]);
        }
        ItemShape::Rect(r) => {
            record.rect = Some([r.origin.x, r.origin.y, r.width, r.height]);
        }
        ItemShape::Ellipse(e) => {
            record.ellipse = Some([e.origin.x, e.origin.y, e.width, e.height]);
        }
        ItemShape::Freehand(f) => {
            record.path = Some(
                f.points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let marker = if i == 0 { PATH_START } else { PATH_LINE };
                        (p.x, p.y, marker.to_string())
                    })
                    .collect(),
            );
        }
        ItemShape::Polygon(p) => {
            record.polygon = Some(p.vertices.iter().map(|v| [v.x, v.y]).collect());
        }
    }

    Some(record)
}

/// Decode a record back into an item, or `None` for unknown types or
/// missing geometry. Decoded items are always editable (selectable and
/// movable), whatever the source item's flags were.
pub fn decode(record: &SerializedRecord) -> Option<Item> {
    let shape = match record.kind.as_str() {
        "Line" => {
            let [x1, y1, x2, y2] = record.line?;
            ItemShape::Line(Line::new(Point::new(x1, y1), Point::new(x2, y2)))
        }
        "Rect" => {
            let [x, y, w, h] = record.rect?;
            ItemShape::Rect(Rectangle::new(Point::new(x, y), w, h))
        }
        "Ellipse" => {
            let [x, y, w, h] = record.ellipse?;
            ItemShape::Ellipse(Ellipse::new(Point::new(x, y), w, h))
        }
        "Freehand" => {
            let path = record.path.as_ref()?;
            if path.is_empty() {
                return None;
            }
            ItemShape::Freehand(Freehand::from_points(
                path.iter().map(|(x, y, _)| Point::new(*x, *y)).collect(),
            ))
        }
        "Polygon" => {
            let vertices = record.polygon.as_ref()?;
            ItemShape::Polygon(Polygon::new(
                vertices.iter().map(|[x, y]| Point::new(*x, *y)).collect(),
            ))
        }
        _ => return None,
    };

    let mut item = Item::new(shape);
    item.position = Point::new(record.pos[0], record.pos[1]);
    item.style = ItemStyle {
        stroke_color: SerializableColor::parse(&record.stroke),
        stroke_width: record.stroke_width,
        fill_color: if record.fill == FILL_NONE {
            None
        } else {
            Some(SerializableColor::parse(&record.fill))
        },
    };
    item.z = record.z;
    item.tag = record.tag.clone();
    Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(item: &Item) -> Item {
        decode(&encode(item).expect("encodes")).expect("decodes")
    }

    #[test]
    fn test_rect_round_trip() {
        let mut item = Item::new(ItemShape::Rect(Rectangle::new(
            Point::new(10.0, 20.0),
            40.0,
            60.0,
        )));
        item.position = Point::new(5.0, -3.0);
        item.z = 4.0;
        item.style.stroke_color = SerializableColor::new(255, 0, 0, 255);
        item.style.stroke_width = 3.0;
        item.style.fill_color = Some(SerializableColor::new(0, 0, 255, 255));
        item.tag = Some("part".to_string());

        let back = round_trip(&item);
        assert_eq!(back.shape, item.shape);
        assert_eq!(back.position, item.position);
        assert_eq!(back.style, item.style);
        assert_eq!(back.z, item.z);
        assert_eq!(back.tag, item.tag);
    }

    #[test]
    fn test_freehand_round_trip_keeps_start_marker() {
        let item = Item::new(ItemShape::Freehand(Freehand::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 0.0),
        ])));
        let record = encode(&item).unwrap();
        let path = record.path.as_ref().unwrap();
        assert_eq!(path[0].2, PATH_START);
        assert_eq!(path[1].2, PATH_LINE);

        let back = decode(&record).unwrap();
        assert_eq!(back.shape, item.shape);
    }

    #[test]
    fn test_line_and_polygon_round_trip() {
        let line = Item::new(ItemShape::Line(Line::new(
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
        )));
        assert_eq!(round_trip(&line).shape, line.shape);

        let poly = Item::new(ItemShape::Polygon(Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(2.0, 3.0),
        ])));
        assert_eq!(round_trip(&poly).shape, poly.shape);
    }

    #[test]
    fn test_decoded_items_are_always_editable() {
        let mut item = Item::new(ItemShape::Ellipse(Ellipse::new(Point::ZERO, 10.0, 10.0)));
        item.selectable = false;
        item.movable = false;
        item.enabled = false;
        item.opacity = 0.35;

        let back = round_trip(&item);
        assert!(back.selectable);
        assert!(back.movable);
        assert!(back.enabled);
        assert!((back.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transparent_fill_encodes_as_none() {
        let mut item = Item::new(ItemShape::Rect(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        item.style.fill_color = Some(SerializableColor::new(9, 9, 9, 0));
        let record = encode(&item).unwrap();
        assert_eq!(record.fill, FILL_NONE);
        assert!(round_trip(&item).style.fill_color.is_none());
    }

    #[test]
    fn test_unknown_type_decodes_to_none() {
        let text = r##"{"type":"Sprite","pos":[0,0],"stroke":"#000000","strokeWidth":1,"fill":"none","z":0}"##;
        let record: SerializedRecord = serde_json::from_str(text).unwrap();
        assert!(decode(&record).is_none());
    }

    #[test]
    fn test_missing_geometry_decodes_to_none() {
        let text = r#"{"type":"Rect","pos":[0,0]}"#;
        let record: SerializedRecord = serde_json::from_str(text).unwrap();
        assert!(decode(&record).is_none());
    }

    #[test]
    fn test_record_defaults_match_wire_format() {
        let text = r#"{"type":"Line","line":[0,0,1,1]}"#;
        let record: SerializedRecord = serde_json::from_str(text).unwrap();
        assert_eq!(record.stroke, "#000000");
        assert!((record.stroke_width - 1.0).abs() < f64::EPSILON);
        assert_eq!(record.fill, FILL_NONE);
        assert!((record.z).abs() < f64::EPSILON);
        let item = decode(&record).unwrap();
        assert_eq!(item.position, Point::ZERO);
    }

    #[test]
    fn test_clipboard_payload_parses() {
        let text = r##"{"items":[{"type":"Rect","pos":[0,0],"rect":[0,0,10,10],"stroke":"#000000","strokeWidth":1,"fill":"none","z":0}]}"##;
        let payload: ClipboardPayload = serde_json::from_str(text).unwrap();
        assert_eq!(payload.items.len(), 1);
        assert!(decode(&payload.items[0]).is_some());
    }
}
