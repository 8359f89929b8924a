//! Record of the source lines hidden by the current projection.

use crate::buffer::TextEdit;

/// One source line that is not shown in the view.
///
/// `line` and `offset` are relative to the start of the result region the
/// projection was computed over; `length` excludes the newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedLine {
    pub line: usize,
    pub offset: usize,
    pub length: usize,
}

/// Hidden lines of one projection pass, anchored in the snapshot it came from.
///
/// Entries are strictly increasing by `line`. A ledger is always rebuilt from a
/// fresh projection, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<RemovedLine>,
    /// Snapshot line where the result region starts
    base_line: usize,
    /// Snapshot byte offset where the result region starts
    base_offset: usize,
}

impl Ledger {
    pub fn new(entries: Vec<RemovedLine>, base_line: usize, base_offset: usize) -> Self {
        debug_assert!(
            entries.windows(2).all(|w| w[0].line < w[1].line),
            "ledger entries must be strictly increasing"
        );
        Self {
            entries,
            base_line,
            base_offset,
        }
    }

    pub fn entries(&self) -> &[RemovedLine] {
        &self.entries
    }

    pub fn base_line(&self) -> usize {
        self.base_line
    }

    pub fn base_offset(&self) -> usize {
        self.base_offset
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute snapshot line numbers of the hidden lines.
    pub fn hidden_source_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(move |r| r.line + self.base_line)
    }

    /// Carry the hidden lines through `edits`, given in the coordinates of `source`.
    ///
    /// A hidden line an edit touches is dropped; the others move with the text
    /// in front of them. The result is anchored at line 0 and describes the view
    /// the host holds once the same edits were applied there.
    pub fn carry_through(&self, source: &str, edits: &[TextEdit]) -> Ledger {
        let entries = self
            .entries
            .iter()
            .zip(self.hidden_source_lines())
            .filter_map(|(removed, line)| {
                let start = self.base_offset + removed.offset;
                let end = start + removed.length;
                let (mut line, mut offset) = (line, start);
                for edit in edits {
                    if edit.range_end() <= start {
                        let replaced = source.get(edit.range_offset..edit.range_end())?;
                        line = (line + newlines(&edit.text)).checked_sub(newlines(replaced))?;
                        offset = (offset + edit.text.len()).checked_sub(edit.range_length)?;
                    } else if edit.range_offset <= end {
                        return None;
                    }
                }
                Some(RemovedLine {
                    line,
                    offset,
                    length: removed.length,
                })
            })
            .collect();
        Ledger::new(entries, 0, 0)
    }
}

fn newlines(text: &str) -> usize {
    memchr::memchr_iter(b'\n', text.as_bytes()).count()
}
