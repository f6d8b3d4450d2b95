//! Built-in proposal heuristic.

use super::{Oracle, Proposal, SuggestionContext};
use crate::items::{Item, ItemShape, Polygon};
use crate::scene::Scene;
use kurbo::Point;

/// Provenance tag carried by generated ear polygons.
pub const TAG_CAT_EAR: &str = "assistant:cat_ear";

/// Suggestion id proposed by [`CatEars`].
pub const CAT_EARS_ID: &str = "cat_ears";

/// Proposes two triangular ears above the first ellipse in the scene.
pub struct CatEars;

impl Oracle for CatEars {
    fn propose(&self, context: &SuggestionContext) -> Option<Proposal> {
        if !context.has_ellipse {
            return None;
        }
        Some(Proposal {
            suggestion_id: CAT_EARS_ID.to_string(),
            label: "Add ears (ellipse detected)".to_string(),
            uncertainty_pct: 70,
            explanation: vec![
                "An ellipse is present (possible head).".to_string(),
                "Adds symmetric elements above it.".to_string(),
                "Optional suggestion, adjust afterwards.".to_string(),
            ],
            action_hint: "Apply if you are drawing a cat, otherwise ignore.".to_string(),
            preview_image: None,
            build: Box::new(build_ears),
        })
    }
}

fn build_ears(scene: &Scene) -> Vec<Item> {
    let Some(ellipse) = scene
        .items_ordered()
        .find(|item| matches!(item.shape, ItemShape::Ellipse(_)))
    else {
        return Vec::new();
    };
    let rect = ellipse.bounds();
    let (w, h) = (rect.width(), rect.height());

    let left = Polygon::new(vec![
        Point::new(rect.x0 + w * 0.25, rect.y0),
        Point::new(rect.x0 + w * 0.15, rect.y0 - h * 0.35),
        Point::new(rect.x0 + w * 0.35, rect.y0),
    ]);
    let right = Polygon::new(vec![
        Point::new(rect.x0 + w * 0.75, rect.y0),
        Point::new(rect.x0 + w * 0.85, rect.y0 - h * 0.35),
        Point::new(rect.x0 + w * 0.65, rect.y0),
    ]);

    [left, right]
        .into_iter()
        .map(|poly| Item::new(ItemShape::Polygon(poly)).with_tag(TAG_CAT_EAR))
        .collect()
}
