//! Line boundary index over a text buffer
//!
//! This module provides the LineIndex structure that records where every line
//! starts, so byte offsets from change events can be turned into line numbers and
//! back. It uses memchr for SIMD-optimized newline detection.

use memchr::memchr_iter;

/// Byte offsets of line starts in a `\n`-separated text.
///
/// A text always has at least one (possibly empty) line; a trailing newline
/// opens a final empty line, matching how editors count lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offsets where each line starts
    ///
    /// - line_offsets[0] = 0 (first line always starts at byte 0)
    /// - line_offsets[n] = byte position after nth newline
    line_offsets: Vec<usize>,

    /// Total length of the indexed text in bytes
    text_len: usize,
}

impl LineIndex {
    /// Index every line of `text`
    pub fn new(text: &str) -> Self {
        let mut line_offsets = Vec::with_capacity(text.len() / 32 + 1);
        line_offsets.push(0);
        line_offsets.extend(memchr_iter(b'\n', text.as_bytes()).map(|pos| pos + 1));
        Self {
            line_offsets,
            text_len: text.len(),
        }
    }

    /// Number of lines, never zero
    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Byte offset where `line` starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_offsets.get(line).copied()
    }

    /// Byte offset where `line` ends, excluding its newline
    pub fn line_end(&self, line: usize) -> Option<usize> {
        let start = self.line_start(line)?;
        Some(match self.line_offsets.get(line + 1) {
            Some(&next) => next - 1,
            None => self.text_len.max(start),
        })
    }

    /// Line containing `offset`
    ///
    /// An offset sitting right after a newline belongs to the following line.
    /// Offsets past the end resolve to the last line.
    pub fn line_of_offset(&self, offset: usize) -> usize {
        self.line_offsets.partition_point(|&start| start <= offset) - 1
    }

    /// Indexed line starts
    pub fn get_line_offsets(&self) -> &[usize] {
        &self.line_offsets
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new("")
    }
}
