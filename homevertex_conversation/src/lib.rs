#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Conversation agent for the host's assist pipeline.
//!
//! Each turn gathers the exposed entities, renders the system prompt from the
//! configured template, and continues the stored chat with Vertex AI.
//!
//! # Key Features
//! - Reserved prompt slots regenerated from live device state every turn
//! - Per-conversation locking so same-id turns never lose updates
//! - Bounded retention of idle and excess conversations
//! - Config-entry setup and teardown with owned Vertex AI sessions

mod agent;
mod entry;
mod history;
mod prompt;
mod session;
mod snapshot;

pub use agent::{TurnError, VertexAgent};
pub use entry::{EntryError, EntryManager, LoadedEntry};
pub use history::{HistoryStore, Lease};
pub use prompt::{JinjaTemplateEngine, PromptRenderer};
pub use session::{ACKNOWLEDGEMENT, ConversationSession, RESERVED_TURNS};
pub use snapshot::{ExposedEntity, collect_exposed_entities};
