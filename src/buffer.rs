//! Host text-buffer abstraction.
//!
//! The sync controller only needs a handful of primitives from whatever hosts a
//! listing: read the text, read a line, and apply a batch of range replacements
//! that reports back the change events it produced. [`MemoryBuffer`] is the
//! in-process implementation used by the document type, the CLI and the tests.

pub mod line_index;
pub mod memory;

use crate::error::Result;

pub use line_index::LineIndex;
pub use memory::MemoryBuffer;

/// Replace `range_length` bytes at `range_offset` with `text`.
///
/// Within one batch every edit is expressed against the text as it was before
/// the batch, and edits do not overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range_offset: usize,
    pub range_length: usize,
    pub text: String,
}

impl TextEdit {
    pub fn replace(range_offset: usize, range_length: usize, text: impl Into<String>) -> Self {
        Self {
            range_offset,
            range_length,
            text: text.into(),
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(offset, 0, text)
    }

    pub fn delete(offset: usize, length: usize) -> Self {
        Self::replace(offset, length, String::new())
    }

    /// Exclusive end of the replaced range
    pub fn range_end(&self) -> usize {
        self.range_offset + self.range_length
    }
}

/// Core trait for the buffer a listing lives in.
pub trait TextBuffer {
    /// Full current text
    fn text(&self) -> &str;

    /// A single line (0-based) without its newline
    fn line(&self, line: usize) -> Option<&str>;

    /// Number of lines, at least one
    fn line_count(&self) -> usize;

    /// Byte offset where `line` starts
    fn line_start(&self, line: usize) -> Option<usize>;

    /// Apply a batch atomically and return its change events in document order.
    ///
    /// A batch that addresses bytes out of range, splits a character or contains
    /// overlapping edits is rejected without modifying the buffer.
    fn apply(&mut self, edits: &[TextEdit]) -> Result<Vec<TextEdit>>;
}
