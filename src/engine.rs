//! The filtering engine: classification, filter parsing, projection and
//! reverse offset mapping. Everything here is pure; state lives in [`crate::sync`].

pub mod classify;
pub mod filter;
pub mod ledger;
pub mod mapper;
pub mod projection;

pub use classify::{classify, LineKind};
pub use filter::{first_file_header, parse_filters, Filter, FilterScope, FilterSet, Polarity};
pub use ledger::{Ledger, RemovedLine};
pub use mapper::{hidden_adjust, map_edit, map_to_source};
pub use projection::{project, Projection};
