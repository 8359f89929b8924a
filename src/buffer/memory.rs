//! In-memory text buffer
//!
//! This module provides the MemoryBuffer implementation that keeps the whole
//! listing in a `String` and re-indexes lines after every applied batch.

use crate::buffer::line_index::LineIndex;
use crate::buffer::{TextBuffer, TextEdit};
use crate::error::{Result, SiftError};

/// Production in-memory buffer for listings
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    /// Current text (source of truth)
    content: String,

    /// Line starts of `content`, rebuilt on every change
    line_index: LineIndex,
}

impl MemoryBuffer {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let line_index = LineIndex::new(&content);
        Self {
            content,
            line_index,
        }
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl TextBuffer for MemoryBuffer {
    fn text(&self) -> &str {
        &self.content
    }

    fn line(&self, line: usize) -> Option<&str> {
        let start = self.line_index.line_start(line)?;
        let end = self.line_index.line_end(line)?;
        Some(&self.content[start..end])
    }

    fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    fn line_start(&self, line: usize) -> Option<usize> {
        self.line_index.line_start(line)
    }

    fn apply(&mut self, edits: &[TextEdit]) -> Result<Vec<TextEdit>> {
        let changes = apply_batch(&mut self.content, edits)?;
        self.line_index = LineIndex::new(&self.content);
        Ok(changes)
    }
}

/// Check a batch against `text` and return it sorted into document order.
pub fn validate_batch(text: &str, edits: &[TextEdit]) -> Result<Vec<TextEdit>> {
    let mut sorted = edits.to_vec();
    sorted.sort_by_key(|e| e.range_offset);

    let mut previous_end = 0usize;
    for edit in &sorted {
        let end = edit.range_end();
        if end > text.len() {
            return Err(SiftError::InvalidEdit {
                offset: edit.range_offset,
                length: edit.range_length,
                text_len: text.len(),
            });
        }
        if edit.range_offset < previous_end {
            return Err(SiftError::OverlappingEdits {
                offset: edit.range_offset,
            });
        }
        for offset in [edit.range_offset, end] {
            if !text.is_char_boundary(offset) {
                return Err(SiftError::NotCharBoundary { offset });
            }
        }
        previous_end = end;
    }

    Ok(sorted)
}

/// Apply a batch of pre-batch-coordinate edits to `text`.
///
/// Nothing is modified unless the whole batch is valid. Returns the batch in
/// document order.
pub fn apply_batch(text: &mut String, edits: &[TextEdit]) -> Result<Vec<TextEdit>> {
    let sorted = validate_batch(text, edits)?;
    for edit in sorted.iter().rev() {
        text.replace_range(edit.range_offset..edit.range_end(), &edit.text);
    }
    Ok(sorted)
}
