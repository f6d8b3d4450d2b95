//! Tool set and per-gesture state.

use crate::items::ItemId;
use kurbo::Point;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Eraser,
    Line,
    Rect,
    Ellipse,
}

impl ToolKind {
    /// Uppercase name used in event logs.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Select => "SELECT",
            ToolKind::Pen => "PEN",
            ToolKind::Eraser => "ERASER",
            ToolKind::Line => "LINE",
            ToolKind::Rect => "RECT",
            ToolKind::Ellipse => "ELLIPSE",
        }
    }
}

/// State of the in-flight pointer gesture.
#[derive(Debug, Clone, Default)]
pub(crate) enum Gesture {
    #[default]
    Idle,
    /// Freehand stroke in progress; the item is live but uncommitted.
    Pen { item: ItemId },
    /// Two-corner shape in progress (line, rect, or ellipse).
    Shape { anchor: Point, item: ItemId },
    /// Eraser held down.
    Eraser,
    /// Selection drag with the pre-gesture position snapshot.
    Select {
        press: Point,
        last: Point,
        origins: Vec<(ItemId, Point)>,
    },
}
