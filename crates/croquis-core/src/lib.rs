//! Croquis core library
//!
//! Platform-agnostic editing engine for the croquis 2D scene editor:
//! the item model, the pointer-gesture tool state machine, the reversible
//! command log, the serialization codec behind clipboard/duplicate/template
//! flows, and the suggestion ghost-preview protocol.

pub mod assistant;
pub mod catalog;
pub mod codec;
pub mod commands;
pub mod events;
pub mod items;
pub mod scene;
pub mod templates;
pub mod tools;

pub use assistant::{
    Decision, DecisionPrompt, Oracle, Proposal, SuggestionContext, SuggestionController, Trigger,
};
pub use codec::{ClipboardPayload, SerializedRecord};
pub use commands::{Command, CommandLog};
pub use events::{EventRecord, EventSink, LoggedEvent, MemorySink};
pub use items::{Item, ItemId, ItemShape, ItemStyle, SerializableColor};
pub use scene::{ItemSet, Scene};
pub use templates::{TemplateError, TemplateMeta, TemplateStore};
pub use tools::ToolKind;
