//! Scene state and the pointer-gesture state machine.
//!
//! The scene owns the live item set, the active tool, the current stroke
//! and fill style, the selection, and the command log. Pointer gestures
//! come in through `pointer_pressed`/`pointer_moved`/`pointer_released`;
//! every resulting mutation is recorded through the command log so it can
//! be undone.

use crate::codec::{self, ClipboardPayload};
use crate::commands::{AddItem, Command, CommandLog, ItemMove, MoveBatch, RemoveItem};
use crate::events::{EventRecord, EventSink};
use crate::items::{
    Ellipse, Freehand, Item, ItemId, ItemShape, ItemStyle, Line, Rectangle, SerializableColor,
};
use crate::tools::{Gesture, ToolKind};
use kurbo::{Point, Vec2};
use std::collections::HashMap;
use std::rc::Rc;

/// Default hit-test tolerance in scene units.
pub const HIT_TOLERANCE: f64 = 3.0;
/// Manhattan displacement below which a SELECT gesture counts as a click.
pub const MOVE_EPSILON: f64 = 2.0;
/// Offset applied to pasted and duplicated items.
pub const PASTE_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// The scene's live items: id map plus insertion order.
#[derive(Debug, Default)]
pub struct ItemSet {
    items: HashMap<ItemId, Item>,
    /// Insertion order; stacking resolves equal z by this order.
    order: Vec<ItemId>,
}

impl ItemSet {
    pub fn insert(&mut self, item: Item) -> ItemId {
        let id = item.id();
        debug_assert!(!self.items.contains_key(&id));
        self.order.push(id);
        self.items.insert(id, item);
        id
    }

    pub fn take(&mut self, id: ItemId) -> Option<Item> {
        self.order.retain(|&other| other != id);
        self.items.remove(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    /// Ids in stacking order (back to front): ascending z, ties resolved
    /// by insertion order.
    pub fn stacking_order(&self) -> Vec<ItemId> {
        let mut ids = self.order.clone();
        ids.sort_by(|a, b| {
            let za = self.items.get(a).map_or(0.0, |i| i.z);
            let zb = self.items.get(b).map_or(0.0, |i| i.z);
            za.partial_cmp(&zb).unwrap_or(std::cmp::Ordering::Equal)
        });
        ids
    }

    /// Items in stacking order (back to front).
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Item> + '_ {
        self.stacking_order()
            .into_iter()
            .filter_map(|id| self.items.get(&id))
    }

    /// Topmost enabled item at a point, if any.
    pub fn top_item_at(&self, point: Point, tolerance: f64) -> Option<ItemId> {
        self.stacking_order()
            .into_iter()
            .rev()
            .find(|id| {
                self.items
                    .get(id)
                    .is_some_and(|item| item.enabled && item.hit_test(point, tolerance))
            })
    }
}

/// The editing scene.
pub struct Scene {
    items: ItemSet,
    history: CommandLog,
    selection: Vec<ItemId>,
    tool: ToolKind,
    gesture: Gesture,
    stroke_color: SerializableColor,
    stroke_width: f64,
    fill_color: Option<SerializableColor>,
    next_z: f64,
    /// Manhattan displacement threshold for SELECT move detection.
    pub move_epsilon: f64,
    /// Offset applied to pasted/duplicated items.
    pub paste_offset: Vec2,
    /// Hit-test tolerance for eraser and selection.
    pub hit_tolerance: f64,
    created_observers: Vec<Box<dyn FnMut(&Item)>>,
    sink: Option<Rc<dyn EventSink>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            items: ItemSet::default(),
            history: CommandLog::new(),
            selection: Vec::new(),
            tool: ToolKind::default(),
            gesture: Gesture::Idle,
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            next_z: 0.0,
            move_epsilon: MOVE_EPSILON,
            paste_offset: PASTE_OFFSET,
            hit_tolerance: HIT_TOLERANCE,
            created_observers: Vec::new(),
            sink: None,
        }
    }

    pub fn set_event_sink(&mut self, sink: Option<Rc<dyn EventSink>>) {
        self.sink = sink;
    }

    fn log(&self, record: EventRecord<'_>) {
        if let Some(sink) = &self.sink {
            sink.log(record);
        }
    }

    // ------------------------------------------------------------------
    // Tool and style configuration
    // ------------------------------------------------------------------

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch the active tool. Cancels any in-flight gesture, removing its
    /// uncommitted live item.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.cancel_gesture();
        self.tool = tool;
        self.log(EventRecord::new("tool_change").tool(tool.name()));
    }

    pub fn stroke_color(&self) -> SerializableColor {
        self.stroke_color
    }

    pub fn set_stroke_color(&mut self, color: SerializableColor) {
        self.stroke_color = color;
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width;
    }

    pub fn fill_color(&self) -> Option<SerializableColor> {
        self.fill_color
    }

    pub fn set_fill_color(&mut self, color: Option<SerializableColor>) {
        self.fill_color = color;
    }

    /// Current style for stroke-only items (pen, line).
    fn stroke_style(&self) -> ItemStyle {
        ItemStyle {
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            fill_color: None,
        }
    }

    /// Current style for fillable items (rect, ellipse).
    fn filled_style(&self) -> ItemStyle {
        ItemStyle {
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            fill_color: self.fill_color,
        }
    }

    // ------------------------------------------------------------------
    // Item access
    // ------------------------------------------------------------------

    pub(crate) fn alloc_z(&mut self) -> f64 {
        self.next_z += 1.0;
        self.next_z
    }

    /// Insert an item directly (not undoable). Used for in-progress
    /// gestures, ghost previews, and the insertion half of undoable adds.
    pub fn insert_item(&mut self, item: Item) -> ItemId {
        self.items.insert(item)
    }

    /// Remove an item directly (not undoable). Missing ids are a no-op.
    pub fn take_item(&mut self, id: ItemId) -> Option<Item> {
        self.selection.retain(|&other| other != id);
        self.items.take(id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    pub fn contains_item(&self, id: ItemId) -> bool {
        self.items.contains(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in stacking order (back to front).
    pub fn items_ordered(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter_ordered()
    }

    /// Topmost enabled item at a point.
    pub fn item_at(&self, point: Point) -> Option<ItemId> {
        self.items.top_item_at(point, self.hit_tolerance)
    }

    /// Reset the session: items, selection, gesture, and history.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selection.clear();
        self.gesture = Gesture::Idle;
        self.history.clear();
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selection(&self) -> &[ItemId] {
        &self.selection
    }

    pub fn select_only(&mut self, id: ItemId) {
        self.selection.clear();
        self.add_to_selection(id);
    }

    pub fn add_to_selection(&mut self, id: ItemId) {
        if self.items.contains(id) && !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all(&mut self) {
        self.selection = self
            .items
            .stacking_order()
            .into_iter()
            .filter(|id| self.items.get(*id).is_some_and(|i| i.selectable))
            .collect();
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.contains(&id)
    }

    fn prune_selection(&mut self) {
        let items = &self.items;
        self.selection.retain(|&id| items.contains(id));
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------

    /// Apply a command and record it in the history.
    pub fn push_command(&mut self, command: Command) {
        self.history.push(command, &mut self.items);
        self.prune_selection();
    }

    pub fn begin_macro(&mut self, label: impl Into<String>) {
        self.history.begin_macro(label);
    }

    pub fn end_macro(&mut self) {
        self.history.end_macro();
    }

    pub fn undo(&mut self) -> bool {
        let done = self.history.undo(&mut self.items);
        self.prune_selection();
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.history.redo(&mut self.items);
        self.prune_selection();
        done
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_count(&self) -> usize {
        self.history.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.history.redo_count()
    }

    pub fn top_undo_label(&self) -> Option<&str> {
        self.history.top_label()
    }

    // ------------------------------------------------------------------
    // Item-created notification
    // ------------------------------------------------------------------

    /// Subscribe to interactively finalized items. Fires exactly once per
    /// finished pen/line/rect/ellipse gesture, never for paste, duplicate,
    /// placement, or ghost commits.
    pub fn on_item_created(&mut self, observer: impl FnMut(&Item) + 'static) {
        self.created_observers.push(Box::new(observer));
    }

    fn notify_created(&mut self, id: ItemId) {
        if self.created_observers.is_empty() {
            return;
        }
        let Some(item) = self.items.get(id) else {
            return;
        };
        for observer in &mut self.created_observers {
            observer(item);
        }
    }

    // ------------------------------------------------------------------
    // Pointer gestures
    // ------------------------------------------------------------------

    pub fn pointer_pressed(&mut self, p: Point) {
        if !matches!(self.gesture, Gesture::Idle) {
            return;
        }
        match self.tool {
            ToolKind::Eraser => {
                self.gesture = Gesture::Eraser;
                self.erase_at(p);
            }
            ToolKind::Pen => {
                let mut item = Item::new(ItemShape::Freehand(Freehand::starting_at(p)));
                item.style = self.stroke_style();
                item.z = self.alloc_z();
                let id = self.items.insert(item);
                self.gesture = Gesture::Pen { item: id };
                self.log(EventRecord::new("pen_start").tool("PEN"));
            }
            ToolKind::Line | ToolKind::Rect | ToolKind::Ellipse => {
                let (shape, style, event) = match self.tool {
                    ToolKind::Line => (
                        ItemShape::Line(Line::new(p, p)),
                        self.stroke_style(),
                        "line_start",
                    ),
                    ToolKind::Rect => (
                        ItemShape::Rect(Rectangle::from_corners(p, p)),
                        self.filled_style(),
                        "rect_start",
                    ),
                    _ => (
                        ItemShape::Ellipse(Ellipse::from_corners(p, p)),
                        self.filled_style(),
                        "ellipse_start",
                    ),
                };
                let mut item = Item::new(shape);
                item.style = style;
                item.z = self.alloc_z();
                let id = self.items.insert(item);
                self.gesture = Gesture::Shape { anchor: p, item: id };
                self.log(EventRecord::new(event).tool(self.tool.name()));
            }
            ToolKind::Select => {
                // Default selection handling runs first, so the captured
                // snapshot reflects the new selection
                let hit = self
                    .item_at(p)
                    .filter(|id| self.items.get(*id).is_some_and(|i| i.selectable));
                match hit {
                    Some(id) => {
                        if !self.selection.contains(&id) {
                            self.selection = vec![id];
                        }
                    }
                    None => self.selection.clear(),
                }
                let origins: Vec<(ItemId, Point)> = self
                    .selection
                    .iter()
                    .filter_map(|id| self.items.get(*id).map(|i| (*id, i.position)))
                    .collect();
                let kind = hit
                    .and_then(|id| self.items.get(id))
                    .map_or("None", |i| i.kind_name());
                self.log(
                    EventRecord::new("select_press")
                        .tool("SELECT")
                        .item_kind(kind),
                );
                self.gesture = Gesture::Select {
                    press: p,
                    last: p,
                    origins,
                };
            }
        }
    }

    pub fn pointer_moved(&mut self, p: Point) {
        if matches!(self.gesture, Gesture::Eraser) {
            self.erase_at(p);
            return;
        }
        match &mut self.gesture {
            Gesture::Idle | Gesture::Eraser => {}
            Gesture::Pen { item } => {
                let id = *item;
                if let Some(item) = self.items.get_mut(id) {
                    if let ItemShape::Freehand(stroke) = &mut item.shape {
                        stroke.push_point(p);
                    }
                }
            }
            Gesture::Shape { anchor, item } => {
                let (anchor, id) = (*anchor, *item);
                if let Some(item) = self.items.get_mut(id) {
                    match &mut item.shape {
                        ItemShape::Line(line) => {
                            line.start = anchor;
                            line.end = p;
                        }
                        ItemShape::Rect(rect) => {
                            *rect = Rectangle::from_corners(anchor, p);
                        }
                        ItemShape::Ellipse(ellipse) => {
                            *ellipse = Ellipse::from_corners(anchor, p);
                        }
                        _ => {}
                    }
                }
            }
            Gesture::Select { last, .. } => {
                let delta = p - *last;
                *last = p;
                for id in &self.selection {
                    if let Some(item) = self.items.get_mut(*id) {
                        if item.movable && item.enabled {
                            item.position += delta;
                        }
                    }
                }
            }
        }
    }

    /// Finish the gesture. Returns the finalized item for drawing tools.
    pub fn pointer_released(&mut self, p: Point) -> Option<ItemId> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Eraser => None,
            Gesture::Pen { item } => self.finalize_item(item),
            Gesture::Shape { item, .. } => self.finalize_item(item),
            Gesture::Select { press, origins, .. } => {
                let delta = p - press;
                let manhattan = delta.x.abs() + delta.y.abs();
                let moves: Vec<ItemMove> = origins
                    .iter()
                    .filter_map(|(id, from)| {
                        self.items.get(*id).and_then(|item| {
                            (item.position != *from)
                                .then(|| ItemMove::new(*id, *from, item.position))
                        })
                    })
                    .collect();
                if manhattan > self.move_epsilon && !moves.is_empty() {
                    self.push_command(Command::MoveBatch(MoveBatch::new(moves)));
                    self.log(EventRecord::new("item_moved").tool("SELECT"));
                }
                None
            }
        }
    }

    /// Record the in-progress item as an undoable addition and notify
    /// item-created observers.
    fn finalize_item(&mut self, id: ItemId) -> Option<ItemId> {
        let (event, kind, notes) = {
            let item = self.items.get(id)?;
            match &item.shape {
                ItemShape::Freehand(stroke) => (
                    "pen_end",
                    item.kind_name(),
                    format!("n_points={}", stroke.len()),
                ),
                ItemShape::Line(line) => (
                    "line_end",
                    item.kind_name(),
                    format!(
                        "({:.1},{:.1})->({:.1},{:.1})",
                        line.start.x, line.start.y, line.end.x, line.end.y
                    ),
                ),
                ItemShape::Rect(rect) => (
                    "rect_end",
                    item.kind_name(),
                    format!(
                        "x={:.1},y={:.1},w={:.1},h={:.1}",
                        rect.origin.x, rect.origin.y, rect.width, rect.height
                    ),
                ),
                ItemShape::Ellipse(ellipse) => (
                    "ellipse_end",
                    item.kind_name(),
                    format!(
                        "x={:.1},y={:.1},w={:.1},h={:.1}",
                        ellipse.origin.x, ellipse.origin.y, ellipse.width, ellipse.height
                    ),
                ),
                ItemShape::Polygon(_) => ("shape_end", item.kind_name(), String::new()),
            }
        };
        self.push_command(Command::Add(AddItem::already_present(id)));
        self.log(
            EventRecord::new(event)
                .tool(self.tool.name())
                .item_kind(kind)
                .notes(&notes),
        );
        self.notify_created(id);
        Some(id)
    }

    fn erase_at(&mut self, p: Point) {
        if let Some(id) = self.items.top_item_at(p, self.hit_tolerance) {
            let kind = self.items.get(id).map_or("?", |i| i.kind_name());
            self.log(
                EventRecord::new("erase")
                    .tool("ERASER")
                    .item_kind(kind),
            );
            self.push_command(Command::Remove(RemoveItem::new(id)));
        }
    }

    fn cancel_gesture(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Pen { item } | Gesture::Shape { item, .. } => {
                // The in-progress item was never committed; drop it
                self.take_item(item);
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Clipboard operations
    // ------------------------------------------------------------------

    /// Encode the selection in stacking order.
    fn selected_records(&self) -> Vec<codec::SerializedRecord> {
        self.items
            .iter_ordered()
            .filter(|item| self.selection.contains(&item.id()))
            .filter_map(codec::encode)
            .collect()
    }

    /// Encode the selection into clipboard text. `None` when nothing is
    /// selected or nothing encodes.
    pub fn copy_selection(&self) -> Option<String> {
        let records = self.selected_records();
        if records.is_empty() {
            return None;
        }
        let notes = format!("n={}", records.len());
        self.log(EventRecord::new("copy").tool("SELECT").notes(&notes));
        serde_json::to_string(&ClipboardPayload { items: records }).ok()
    }

    /// Copy the selection, then remove it as one undoable unit.
    pub fn cut_selection(&mut self) -> Option<String> {
        let text = self.copy_selection()?;
        let ids: Vec<ItemId> = self.selection.clone();
        self.begin_macro("Cut");
        for id in ids {
            if self.items.contains(id) {
                self.push_command(Command::Remove(RemoveItem::new(id)));
            }
        }
        self.end_macro();
        self.log(EventRecord::new("cut").tool("SELECT"));
        Some(text)
    }

    /// Decode clipboard text and insert the items at the paste offset.
    /// Malformed text is an empty paste, never an error. The new items
    /// become the selection.
    pub fn paste(&mut self, text: &str) -> Vec<ItemId> {
        let Ok(payload) = serde_json::from_str::<ClipboardPayload>(text) else {
            return Vec::new();
        };
        let offset = self.paste_offset;
        let mut new_ids = Vec::new();
        self.begin_macro("Paste");
        for record in &payload.items {
            if let Some(mut item) = codec::decode(record) {
                item.position += offset;
                let id = self.insert_item(item);
                self.push_command(Command::Add(AddItem::already_present(id)));
                new_ids.push(id);
            }
        }
        self.end_macro();
        if !new_ids.is_empty() {
            self.selection = new_ids.clone();
            let notes = format!("n={}", new_ids.len());
            self.log(EventRecord::new("paste").tool("SELECT").notes(&notes));
        }
        new_ids
    }

    /// Duplicate the selection through an encode/decode round trip,
    /// bypassing clipboard text. The duplicates become the selection.
    pub fn duplicate_selection(&mut self) -> Vec<ItemId> {
        let records = self.selected_records();
        if records.is_empty() {
            return Vec::new();
        }
        let offset = self.paste_offset;
        let mut new_ids = Vec::new();
        self.begin_macro("Duplicate");
        for record in &records {
            if let Some(mut item) = codec::decode(record) {
                item.position += offset;
                let id = self.insert_item(item);
                self.push_command(Command::Add(AddItem::already_present(id)));
                new_ids.push(id);
            }
        }
        self.end_macro();
        if !new_ids.is_empty() {
            self.selection = new_ids.clone();
            let notes = format!("n={}", new_ids.len());
            self.log(EventRecord::new("duplicate").tool("SELECT").notes(&notes));
        }
        new_ids
    }

    // ------------------------------------------------------------------
    // Batch placement (generation catalog, template import)
    // ------------------------------------------------------------------

    /// Place a group of items at an origin as one undoable unit. Does not
    /// fire item-created notifications.
    pub fn place_items(
        &mut self,
        items: Vec<Item>,
        origin: Point,
        label: &str,
    ) -> Vec<ItemId> {
        if items.is_empty() {
            return Vec::new();
        }
        let mut ids = Vec::with_capacity(items.len());
        self.begin_macro(label);
        for mut item in items {
            item.position = origin;
            item.z = self.alloc_z();
            let id = self.insert_item(item);
            self.push_command(Command::Add(AddItem::already_present(id)));
            ids.push(id);
        }
        self.end_macro();
        self.log(EventRecord::new("gen_add").tool("GEN").notes(label));
        ids
    }
}
