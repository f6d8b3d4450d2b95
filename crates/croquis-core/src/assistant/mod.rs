//! Suggestion flow: oracle consultation, ghost preview, commit/rollback.
//!
//! The controller drives the scene exactly like a user would, through the
//! same insert/remove/macro surface the tool state machine uses. The one
//! hard invariant: a flow never terminates with ghost items still in the
//! scene unless they were committed.

pub mod heuristics;

use crate::commands::{AddItem, Command};
use crate::events::{EventRecord, EventSink};
use crate::items::{Item, ItemId, ItemShape};
use crate::scene::Scene;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

/// Opacity applied to ghost-preview items.
pub const GHOST_OPACITY: f64 = 0.35;

/// Origin of a suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Manual,
    Auto,
}

impl Trigger {
    pub fn name(self) -> &'static str {
        match self {
            Trigger::Manual => "manual",
            Trigger::Auto => "auto",
        }
    }
}

/// Snapshot of scene state handed to the oracle.
#[derive(Debug, Clone)]
pub struct SuggestionContext {
    pub trigger: Trigger,
    pub has_ellipse: bool,
    pub has_rect: bool,
    /// Variant name of the item whose creation triggered an auto flow.
    pub created_kind: Option<&'static str>,
    /// Provenance tags currently present in the scene.
    pub present_tags: BTreeSet<String>,
    /// Suggestion ids already declined in an auto flow this session.
    pub auto_suppressed: HashSet<String>,
}

/// A proposed addition: presentation data plus an item factory.
pub struct Proposal {
    pub suggestion_id: String,
    pub label: String,
    pub uncertainty_pct: u8,
    /// Explanation lines; presenters show at most three.
    pub explanation: Vec<String>,
    pub action_hint: String,
    pub preview_image: Option<PathBuf>,
    /// Builds the suggested items against the current scene.
    pub build: Box<dyn Fn(&Scene) -> Vec<Item>>,
}

/// Maps a context snapshot to a proposal, or abstains with `None`.
pub trait Oracle {
    fn propose(&self, context: &SuggestionContext) -> Option<Proposal>;
}

/// The user's decision over a presented proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Ignore,
    Override,
    Cancel,
}

impl Decision {
    pub fn name(self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Ignore => "ignore",
            Decision::Override => "override",
            Decision::Cancel => "cancel",
        }
    }
}

/// Blocking presentation surface for proposals.
pub trait DecisionPrompt {
    /// Present the proposal and block until the user chooses. Dismissing
    /// the presentation without a choice must be reported as `Cancel`.
    fn present(&mut self, proposal: &Proposal) -> Decision;

    /// Informs the user that a manual invocation produced no proposal.
    fn no_suggestion(&mut self) {}
}

/// Removes un-committed preview items from the scene when dropped.
///
/// Armed around the blocking decision step so that normal return, early
/// return, and unwinding all converge on the same cleanup; only an explicit
/// commit disarms it.
struct GhostSweep<'a> {
    scene: &'a mut Scene,
    ghost: &'a mut Vec<ItemId>,
    armed: bool,
}

impl Drop for GhostSweep<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        for id in self.ghost.drain(..) {
            // Items removed through unrelated paths count as already cleared
            self.scene.take_item(id);
        }
    }
}

/// Orchestrates the oracle call, ghost preview, decision capture, and
/// commit/rollback on top of the scene's command surface.
pub struct SuggestionController {
    oracle: Box<dyn Oracle>,
    prompt: Box<dyn DecisionPrompt>,
    sink: Option<Rc<dyn EventSink>>,
    auto_enabled: bool,
    auto_suppressed: HashSet<String>,
    ghost: Vec<ItemId>,
}

impl SuggestionController {
    pub fn new(oracle: Box<dyn Oracle>, prompt: Box<dyn DecisionPrompt>) -> Self {
        Self {
            oracle,
            prompt,
            sink: None,
            auto_enabled: false,
            auto_suppressed: HashSet::new(),
            ghost: Vec::new(),
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

    pub fn auto_enabled(&self) -> bool {
        self.auto_enabled
    }

    /// Enable/disable auto suggestions fired on item creation.
    pub fn set_auto_enabled(&mut self, enabled: bool) {
        self.auto_enabled = enabled;
        let notes = enabled.to_string();
        self.log(EventRecord::new("assistant_auto_toggle").notes(&notes));
    }

    pub fn has_active_ghost(&self) -> bool {
        !self.ghost.is_empty()
    }

    /// Manual trigger: the user explicitly asked for a suggestion.
    pub fn invoke_manual(&mut self, scene: &mut Scene) {
        self.log(EventRecord::new("invoke_help").tool("ASSISTANT"));
        self.try_suggest(scene, Trigger::Manual, None);
    }

    /// Auto trigger: the host forwards the scene's item-created
    /// notification here. Does nothing while auto is disabled.
    pub fn notify_item_created(&mut self, scene: &mut Scene, item_id: ItemId) {
        if !self.auto_enabled {
            return;
        }
        self.try_suggest(scene, Trigger::Auto, Some(item_id));
    }

    fn build_context(
        &self,
        scene: &Scene,
        trigger: Trigger,
        created: Option<ItemId>,
    ) -> SuggestionContext {
        let mut has_ellipse = false;
        let mut has_rect = false;
        let mut present_tags = BTreeSet::new();
        for item in scene.items_ordered() {
            if !item.enabled {
                continue;
            }
            match item.shape {
                ItemShape::Ellipse(_) => has_ellipse = true,
                ItemShape::Rect(_) => has_rect = true,
                _ => {}
            }
            if let Some(tag) = &item.tag {
                present_tags.insert(tag.clone());
            }
        }
        SuggestionContext {
            trigger,
            has_ellipse,
            has_rect,
            created_kind: created.and_then(|id| scene.item(id)).map(Item::kind_name),
            present_tags,
            auto_suppressed: self.auto_suppressed.clone(),
        }
    }

    fn try_suggest(&mut self, scene: &mut Scene, trigger: Trigger, created: Option<ItemId>) {
        let context = self.build_context(scene, trigger, created);
        let started = Instant::now();

        let Some(proposal) = self.oracle.propose(&context) else {
            let notes = format!("none:{}", trigger.name());
            self.log(EventRecord::new("ai_output").tool("ASSISTANT").notes(&notes));
            // Auto flows end silently; only manual invocations surface it
            if trigger == Trigger::Manual {
                self.prompt.no_suggestion();
            }
            return;
        };

        // Declined auto suggestions stay suppressed for the session, even
        // if the oracle ignores the set it was handed
        if trigger == Trigger::Auto && self.auto_suppressed.contains(&proposal.suggestion_id) {
            return;
        }

        if trigger == Trigger::Auto {
            let notes = format!("trigger=auto;sid={}", proposal.suggestion_id);
            self.log(
                EventRecord::new("autosuggest_shown")
                    .tool("ASSISTANT")
                    .notes(&notes),
            );
        }

        // At most one active preview
        self.clear_ghost(scene);

        let mut ids = Vec::new();
        for mut item in (proposal.build)(scene) {
            item.opacity = GHOST_OPACITY;
            item.enabled = false;
            item.selectable = false;
            item.movable = false;
            item.z = scene.alloc_z();
            ids.push(scene.insert_item(item));
        }
        self.ghost = ids;

        // The sweep guard guarantees rollback on every exit from the
        // decision step; a commit disarms it first.
        let decision = {
            let Self { prompt, ghost, .. } = self;
            let mut sweep = GhostSweep {
                scene: &mut *scene,
                ghost,
                armed: true,
            };
            let decision = prompt.present(&proposal);
            if decision == Decision::Accept {
                sweep.armed = false;
            }
            decision
        };

        let decision_ms = started.elapsed().as_millis();
        let sid = proposal.suggestion_id.as_str();
        let notes = format!(
            "{}:{}:{}:ms={}",
            decision.name(),
            trigger.name(),
            sid,
            decision_ms
        );
        self.log(EventRecord::new("user_action").tool("ASSISTANT").notes(&notes));

        if decision == Decision::Accept {
            self.commit_ghosts(scene, sid);
            let event = match trigger {
                Trigger::Auto => "autosuggest_accept",
                Trigger::Manual => "assistant_accept",
            };
            let notes = format!("trigger={};sid={};ms={}", trigger.name(), sid, decision_ms);
            self.log(EventRecord::new(event).tool("ASSISTANT").notes(&notes));
        } else {
            // Ghosts were already swept by the guard
            if trigger == Trigger::Auto {
                self.auto_suppressed.insert(sid.to_string());
                self.log(
                    EventRecord::new("assistant_suppress")
                        .tool("ASSISTANT")
                        .notes(sid),
                );
            }
            let event = match trigger {
                Trigger::Auto => "autosuggest_reject",
                Trigger::Manual => "assistant_reject",
            };
            let notes = format!("trigger={};sid={};ms={}", trigger.name(), sid, decision_ms);
            self.log(EventRecord::new(event).tool("ASSISTANT").notes(&notes));
        }
    }

    /// Restore the ghosts to normal items and record them as one undoable
    /// macro. The ghost list is cleared without removing anything.
    fn commit_ghosts(&mut self, scene: &mut Scene, suggestion_id: &str) {
        let ids: Vec<ItemId> = self.ghost.drain(..).collect();
        scene.begin_macro(format!("Assistant: {suggestion_id}"));
        for id in ids {
            let Some(item) = scene.item_mut(id) else {
                // Removed through an unrelated path: nothing to commit
                continue;
            };
            item.opacity = 1.0;
            item.enabled = true;
            item.selectable = true;
            item.movable = true;
            scene.push_command(Command::Add(AddItem::already_present(id)));
        }
        scene.end_macro();
    }

    /// Remove every ghost still attached to the scene. Missing items are
    /// treated as already cleared; no active ghost set is a no-op.
    fn clear_ghost(&mut self, scene: &mut Scene) {
        for id in self.ghost.drain(..) {
            scene.take_item(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::Rectangle;
    use crate::tools::ToolKind;
    use kurbo::Point;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct PromptState {
        decisions: RefCell<VecDeque<Decision>>,
        presented: Cell<usize>,
        no_suggestion: Cell<usize>,
    }

    struct ScriptedPrompt(Rc<PromptState>);

    impl DecisionPrompt for ScriptedPrompt {
        fn present(&mut self, _proposal: &Proposal) -> Decision {
            self.0.presented.set(self.0.presented.get() + 1);
            self.0
                .decisions
                .borrow_mut()
                .pop_front()
                .unwrap_or(Decision::Cancel)
        }

        fn no_suggestion(&mut self) {
            self.0.no_suggestion.set(self.0.no_suggestion.get() + 1);
        }
    }

    struct RectOracle;

    impl Oracle for RectOracle {
        fn propose(&self, _context: &SuggestionContext) -> Option<Proposal> {
            Some(Proposal {
                suggestion_id: "extra_rect".to_string(),
                label: "Add a rectangle".to_string(),
                uncertainty_pct: 50,
                explanation: vec!["A rectangle usually helps.".to_string()],
                action_hint: "Apply or ignore.".to_string(),
                preview_image: None,
                build: Box::new(|_scene| {
                    vec![
                        Item::new(ItemShape::Rect(Rectangle::new(Point::ZERO, 10.0, 10.0)))
                            .with_tag("assistant:extra_rect"),
                        Item::new(ItemShape::Rect(Rectangle::new(
                            Point::new(20.0, 0.0),
                            10.0,
                            10.0,
                        )))
                        .with_tag("assistant:extra_rect"),
                    ]
                }),
            })
        }
    }

    struct Abstainer;

    impl Oracle for Abstainer {
        fn propose(&self, _context: &SuggestionContext) -> Option<Proposal> {
            None
        }
    }

    fn controller_with(
        oracle: impl Oracle + 'static,
        decisions: Vec<Decision>,
    ) -> (SuggestionController, Rc<PromptState>) {
        let state = Rc::new(PromptState {
            decisions: RefCell::new(decisions.into()),
            ..PromptState::default()
        });
        let controller = SuggestionController::new(
            Box::new(oracle),
            Box::new(ScriptedPrompt(state.clone())),
        );
        (controller, state)
    }

    #[test]
    fn test_accept_commits_ghosts_as_one_undo_unit() {
        let mut scene = Scene::new();
        let (mut controller, state) = controller_with(RectOracle, vec![Decision::Accept]);

        controller.invoke_manual(&mut scene);

        assert_eq!(state.presented.get(), 1);
        assert_eq!(scene.len(), 2);
        assert!(!controller.has_active_ghost());
        for item in scene.items_ordered() {
            assert!(item.enabled);
            assert!(item.selectable);
            assert!(item.movable);
            assert!((item.opacity - 1.0).abs() < f64::EPSILON);
        }

        // one undo removes the whole suggestion
        assert_eq!(scene.undo_count(), 1);
        assert!(scene.undo());
        assert!(scene.is_empty());
        assert!(scene.redo());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_ignore_leaves_scene_and_history_untouched() {
        let mut scene = Scene::new();
        let (mut controller, _state) = controller_with(RectOracle, vec![Decision::Ignore]);

        let undo_before = scene.undo_count();
        controller.invoke_manual(&mut scene);

        assert!(scene.is_empty());
        assert!(!controller.has_active_ghost());
        assert_eq!(scene.undo_count(), undo_before);
    }

    #[test]
    fn test_cancel_and_override_roll_back_like_ignore() {
        for decision in [Decision::Cancel, Decision::Override] {
            let mut scene = Scene::new();
            let (mut controller, _state) = controller_with(RectOracle, vec![decision]);
            controller.invoke_manual(&mut scene);
            assert!(scene.is_empty());
            assert_eq!(scene.undo_count(), 0);
        }
    }

    #[test]
    fn test_declined_auto_suggestion_is_suppressed_for_session() {
        let mut scene = Scene::new();
        let (mut controller, state) =
            controller_with(RectOracle, vec![Decision::Ignore, Decision::Accept]);
        controller.set_auto_enabled(true);

        let trigger_item = scene.insert_item(Item::new(ItemShape::Rect(Rectangle::new(
            Point::ZERO,
            5.0,
            5.0,
        ))));

        controller.notify_item_created(&mut scene, trigger_item);
        assert_eq!(state.presented.get(), 1);

        // same suggestion id: suppressed, no second presentation
        controller.notify_item_created(&mut scene, trigger_item);
        assert_eq!(state.presented.get(), 1);

        // manual invocations are never suppressed
        controller.invoke_manual(&mut scene);
        assert_eq!(state.presented.get(), 2);
    }

    #[test]
    fn test_auto_disabled_never_presents() {
        let mut scene = Scene::new();
        let (mut controller, state) = controller_with(RectOracle, vec![Decision::Accept]);

        let id = scene.insert_item(Item::new(ItemShape::Rect(Rectangle::new(
            Point::ZERO,
            5.0,
            5.0,
        ))));
        controller.notify_item_created(&mut scene, id);
        assert_eq!(state.presented.get(), 0);
    }

    #[test]
    fn test_manual_abstention_surfaces_no_suggestion() {
        let mut scene = Scene::new();
        let (mut controller, state) = controller_with(Abstainer, vec![]);

        controller.invoke_manual(&mut scene);
        assert_eq!(state.no_suggestion.get(), 1);

        // auto abstention ends silently
        controller.set_auto_enabled(true);
        let id = scene.insert_item(Item::new(ItemShape::Rect(Rectangle::new(
            Point::ZERO,
            5.0,
            5.0,
        ))));
        controller.notify_item_created(&mut scene, id);
        assert_eq!(state.no_suggestion.get(), 1);
    }

    #[test]
    fn test_flow_events_are_logged() {
        let sink = Rc::new(crate::events::MemorySink::new());
        let mut scene = Scene::new();
        let (mut controller, _state) = controller_with(RectOracle, vec![Decision::Accept]);
        controller.set_event_sink(Some(sink.clone()));

        controller.invoke_manual(&mut scene);

        let names = sink.names();
        assert_eq!(names, vec!["invoke_help", "user_action", "assistant_accept"]);
    }

    #[test]
    fn test_end_to_end_auto_flow_with_builtin_oracle() {
        let mut scene = Scene::new();
        let (mut controller, state) =
            controller_with(heuristics::CatEars, vec![Decision::Accept]);
        controller.set_auto_enabled(true);

        // user draws an ellipse; the host forwards the created id
        scene.set_tool(ToolKind::Ellipse);
        scene.pointer_pressed(Point::new(0.0, 0.0));
        scene.pointer_moved(Point::new(100.0, 80.0));
        let created = scene.pointer_released(Point::new(100.0, 80.0)).unwrap();
        controller.notify_item_created(&mut scene, created);

        assert_eq!(state.presented.get(), 1);
        // ellipse + two ears
        assert_eq!(scene.len(), 3);
        let ears: Vec<&Item> = scene
            .items_ordered()
            .filter(|i| i.tag.as_deref() == Some(heuristics::TAG_CAT_EAR))
            .collect();
        assert_eq!(ears.len(), 2);

        // undoing the suggestion keeps the ellipse
        assert!(scene.undo());
        assert_eq!(scene.len(), 1);
    }
}
