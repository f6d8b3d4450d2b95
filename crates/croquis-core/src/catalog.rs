//! Built-in generation catalog: multi-part item groups keyed by
//! `(category, item_id)`, ready to hand to [`Scene::place_items`].
//!
//! [`Scene::place_items`]: crate::scene::Scene::place_items

use crate::items::{Ellipse, Item, ItemShape, Line, Rectangle};
use kurbo::Point;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Item {
    Item::new(ItemShape::Rect(Rectangle::new(Point::new(x, y), w, h)))
}

fn ellipse(x: f64, y: f64, w: f64, h: f64) -> Item {
    Item::new(ItemShape::Ellipse(Ellipse::new(Point::new(x, y), w, h)))
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Item {
    Item::new(ItemShape::Line(Line::new(
        Point::new(x1, y1),
        Point::new(x2, y2),
    )))
}

/// Build the items of a catalog entry. Unknown keys yield an empty group.
pub fn create_generation_items(category: &str, item_id: &str) -> Vec<Item> {
    match (category, item_id) {
        // Door = vertical rectangle + knob
        ("Porte", "door_small") => vec![rect(0.0, 0.0, 60.0, 100.0), ellipse(45.0, 50.0, 8.0, 8.0)],
        ("Porte", "door_double") => {
            vec![rect(0.0, 0.0, 50.0, 110.0), rect(52.0, 0.0, 50.0, 110.0)]
        }
        // Simplification: rectangle + ellipse on top
        ("Porte", "door_round") => vec![rect(0.0, 20.0, 70.0, 90.0), ellipse(0.0, 0.0, 70.0, 40.0)],
        ("Roue", "wheel_small") => vec![ellipse(0.0, 0.0, 50.0, 50.0)],
        ("Roue", "wheel_big") => vec![ellipse(0.0, 0.0, 80.0, 80.0)],
        // Wheel with two crossed spokes
        ("Roue", "wheel_spoked") => vec![
            ellipse(0.0, 0.0, 70.0, 70.0),
            line(0.0, 35.0, 70.0, 35.0),
            line(35.0, 0.0, 35.0, 70.0),
        ],
        ("Carrosserie", "body_compact") => {
            vec![rect(0.0, 20.0, 140.0, 50.0), rect(30.0, 0.0, 60.0, 30.0)]
        }
        ("Carrosserie", "body_sedan") => {
            vec![rect(0.0, 25.0, 180.0, 50.0), rect(50.0, 0.0, 80.0, 35.0)]
        }
        ("Carrosserie", "body_truck") => {
            vec![rect(0.0, 0.0, 60.0, 35.0), rect(65.0, 10.0, 135.0, 70.0)]
        }
        _ => Vec::new(),
    }
}
