//! Reversible scene mutations and the command log.
//!
//! Commands own exactly the state they need to apply and reverse
//! themselves. An item that has been undone out of the scene lives inside
//! the command stash until a redo re-inserts it.

use crate::items::{Item, ItemId};
use crate::scene::ItemSet;
use kurbo::Point;

/// A reversible mutation of the scene's live item set.
#[derive(Debug)]
pub enum Command {
    Add(AddItem),
    Remove(RemoveItem),
    MoveBatch(MoveBatch),
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::Add(_) => "Add item",
            Command::Remove(_) => "Remove item",
            Command::MoveBatch(_) => "Move items",
        }
    }

    pub(crate) fn redo(&mut self, items: &mut ItemSet) {
        match self {
            Command::Add(c) => c.redo(items),
            Command::Remove(c) => c.redo(items),
            Command::MoveBatch(c) => c.redo(items),
        }
    }

    pub(crate) fn undo(&mut self, items: &mut ItemSet) {
        match self {
            Command::Add(c) => c.undo(items),
            Command::Remove(c) => c.undo(items),
            Command::MoveBatch(c) => c.undo(items),
        }
    }
}

/// Records the addition of an item that is already live in the scene.
///
/// The first redo is a no-op (the item is already visible as the in-progress
/// or ghost preview); after an undo, redo performs the real re-insertion.
#[derive(Debug)]
pub struct AddItem {
    id: ItemId,
    /// Holds the item while it is undone out of the scene.
    stash: Option<Item>,
    skip_first_redo: bool,
}

impl AddItem {
    pub fn already_present(id: ItemId) -> Self {
        Self {
            id,
            stash: None,
            skip_first_redo: true,
        }
    }

    fn redo(&mut self, items: &mut ItemSet) {
        if self.skip_first_redo {
            self.skip_first_redo = false;
            return;
        }
        if !items.contains(self.id) {
            if let Some(item) = self.stash.take() {
                items.insert(item);
            }
        }
    }

    fn undo(&mut self, items: &mut ItemSet) {
        // Only remove if currently live; tolerates removal through other paths
        if let Some(item) = items.take(self.id) {
            self.stash = Some(item);
        }
    }
}

/// Removes an item, stashing it so undo can restore it with its position.
#[derive(Debug)]
pub struct RemoveItem {
    id: ItemId,
    stash: Option<Item>,
}

impl RemoveItem {
    pub fn new(id: ItemId) -> Self {
        Self { id, stash: None }
    }

    fn redo(&mut self, items: &mut ItemSet) {
        if let Some(item) = items.take(self.id) {
            self.stash = Some(item);
        }
    }

    fn undo(&mut self, items: &mut ItemSet) {
        if !items.contains(self.id) {
            if let Some(item) = self.stash.take() {
                items.insert(item);
            }
        }
    }
}

/// One item's position change within a [`MoveBatch`].
#[derive(Debug, Clone, Copy)]
pub struct ItemMove {
    pub id: ItemId,
    pub from: Point,
    pub to: Point,
}

impl ItemMove {
    pub fn new(id: ItemId, from: Point, to: Point) -> Self {
        Self { id, from, to }
    }
}

/// Moves a set of items between two position snapshots. Items missing from
/// the scene are left untouched.
#[derive(Debug)]
pub struct MoveBatch {
    moves: Vec<ItemMove>,
}

impl MoveBatch {
    pub fn new(moves: Vec<ItemMove>) -> Self {
        Self { moves }
    }

    fn redo(&mut self, items: &mut ItemSet) {
        for m in &self.moves {
            if let Some(item) = items.get_mut(m.id) {
                item.position = m.to;
            }
        }
    }

    fn undo(&mut self, items: &mut ItemSet) {
        for m in &self.moves {
            if let Some(item) = items.get_mut(m.id) {
                item.position = m.from;
            }
        }
    }
}

/// One user-visible undo unit: a single command or a named macro.
#[derive(Debug)]
enum Entry {
    Single(Command),
    Macro { label: String, commands: Vec<Command> },
}

impl Entry {
    fn label(&self) -> &str {
        match self {
            Entry::Single(c) => c.label(),
            Entry::Macro { label, .. } => label,
        }
    }

    fn redo(&mut self, items: &mut ItemSet) {
        match self {
            Entry::Single(c) => c.redo(items),
            Entry::Macro { commands, .. } => {
                for c in commands.iter_mut() {
                    c.redo(items);
                }
            }
        }
    }

    fn undo(&mut self, items: &mut ItemSet) {
        match self {
            Entry::Single(c) => c.undo(items),
            Entry::Macro { commands, .. } => {
                for c in commands.iter_mut().rev() {
                    c.undo(items);
                }
            }
        }
    }
}

/// Ordered command history with a cursor separating done from undone.
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: Vec<Entry>,
    /// Entries below the cursor are done; the rest are undone.
    cursor: usize,
    open_macro: Option<(String, Vec<Command>)>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the command and record it. Inside an open macro the command
    /// joins the macro group instead of the top-level log.
    pub fn push(&mut self, mut command: Command, items: &mut ItemSet) {
        command.redo(items);
        if let Some((_, commands)) = &mut self.open_macro {
            commands.push(command);
            return;
        }
        self.entries.truncate(self.cursor);
        self.entries.push(Entry::Single(command));
        self.cursor = self.entries.len();
    }

    /// Open a macro; subsequent pushes group into one undo unit.
    pub fn begin_macro(&mut self, label: impl Into<String>) {
        if self.open_macro.is_some() {
            log::warn!("begin_macro while a macro is already open; closing it");
            self.force_end_macro();
        }
        self.entries.truncate(self.cursor);
        self.open_macro = Some((label.into(), Vec::new()));
    }

    /// Close the open macro. Empty macros are dropped.
    pub fn end_macro(&mut self) {
        self.force_end_macro();
    }

    fn force_end_macro(&mut self) {
        let Some((label, commands)) = self.open_macro.take() else {
            return;
        };
        if commands.is_empty() {
            return;
        }
        self.entries.truncate(self.cursor);
        self.entries.push(Entry::Macro { label, commands });
        self.cursor = self.entries.len();
    }

    /// Undo the most recent done entry. Returns false if nothing to undo.
    pub fn undo(&mut self, items: &mut ItemSet) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.entries[self.cursor].undo(items);
        true
    }

    /// Redo the most recently undone entry. Returns false if nothing to redo.
    pub fn redo(&mut self, items: &mut ItemSet) -> bool {
        if self.cursor == self.entries.len() {
            return false;
        }
        self.entries[self.cursor].redo(items);
        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Number of done entries.
    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    /// Number of undone entries.
    pub fn redo_count(&self) -> usize {
        self.entries.len() - self.cursor
    }

    /// Label of the entry a subsequent undo would revert.
    pub fn top_label(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .map(|i| self.entries[i].label())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.open_macro = None;
    }
}
