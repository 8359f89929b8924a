//! Stateful side of the engine: per-buffer sessions and the document that owns one.

pub mod document;
pub mod session;

pub use document::SearchResultDocument;
pub use session::{Materialization, Session, SessionState};
