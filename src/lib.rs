//! # resultsift - Filtered views over search-result listings
//!
//! A search-result listing interleaves `<path>:` header lines with indented
//! `<line>: <snippet>` results. Typing filter lines such as `+needle`, `-noise`,
//! `file+src/` or `file-tests/` above the first header narrows the listing in
//! place, and edits made in the narrowed view are written back to the full,
//! unfiltered text so nothing hidden is ever lost.
//!
//! ## Architecture
//!
//! - [`engine`] - Pure pieces: line classification, filter parsing, projection
//!   and reverse offset mapping
//! - [`buffer`] - Host buffer abstraction with an in-memory implementation
//! - [`sync`] - Per-buffer session state machine and the document that owns it
//! - [`config`] - Engine tunables, optionally loaded from TOML
//! - [`error`] - Centralized error types and handling

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod sync;

pub use error::{Result, SiftError};

pub use buffer::{MemoryBuffer, TextBuffer, TextEdit};
pub use config::EngineConfig;
pub use engine::{parse_filters, project, Filter, FilterSet, Ledger, LineKind};
pub use sync::{Materialization, SearchResultDocument, Session, SessionState};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
