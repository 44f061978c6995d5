//! Shared value records and contracts for the ngxls workspace.
//!
//! Everything here is host-agnostic: the bridge's boundary layer converts
//! whatever the editor hands it into these plain records, and nothing in
//! the domain crates ever touches a host API type.

pub mod document;
pub mod settings;
pub mod ui;

pub use document::{Document, Position, Range, TextEdit};
pub use settings::Settings;
pub use ui::{NullUi, Progress, Ui, progress};
