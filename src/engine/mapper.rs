//! Reverse mapping: view coordinates to source snapshot coordinates.
//!
//! The view is the snapshot minus the lines recorded in the ledger, so a view
//! offset maps to the source by adding the bytes of every hidden line that sits
//! before the view line containing it.
//!
//! Boundary rule: a position on the first visible line after a hidden run is
//! placed after the run. Text typed at a boundary extends the visible content
//! that follows instead of landing inside lines the next projection hides again.

use crate::buffer::{LineIndex, TextEdit};
use crate::engine::ledger::Ledger;
use log::{trace, warn};

/// Bytes of hidden source text preceding view line `view_line`.
///
/// `view_line` is a line of the whole view; lines above the ledger's result
/// region carry no adjustment.
pub fn hidden_adjust(ledger: &Ledger, view_line: usize) -> usize {
    let Some(target) = view_line.checked_sub(ledger.base_line()) else {
        return 0;
    };

    let mut adjust = 0usize;
    let mut visible = 0usize;
    let mut next_line = 0usize;
    let mut inside_boundary_run = false;

    for removed in ledger.entries() {
        let Some(gap) = removed.line.checked_sub(next_line) else {
            warn!(
                "ledger out of order at line {}; mapping with partial adjustment",
                removed.line
            );
            break;
        };
        if inside_boundary_run && gap > 0 {
            break;
        }

        visible += gap;
        next_line = removed.line + 1;
        if visible > target {
            break;
        }
        if visible == target {
            inside_boundary_run = true;
        }
        adjust += removed.length + 1;
    }

    adjust
}

/// Map a byte offset inside view line `view_line` to the source snapshot.
pub fn map_to_source(ledger: &Ledger, view_line: usize, view_offset: usize) -> usize {
    view_offset + hidden_adjust(ledger, view_line)
}

/// Map a whole edit expressed against the view described by `view`.
///
/// The start follows [`map_to_source`]. The end does too, except when it sits at
/// the very start of a later line: it then attaches before the hidden run in
/// front of that line, so removing a visible line keeps the hidden lines after it.
pub fn map_edit(ledger: &Ledger, view: &LineIndex, edit: &TextEdit) -> TextEdit {
    let start = edit.range_offset;
    let end = edit.range_offset + edit.range_length;

    let start_line = view.line_of_offset(start);
    let end_line = view.line_of_offset(end);

    let source_start = map_to_source(ledger, start_line, start);
    let source_end = if end_line > start_line && view.line_start(end_line) == Some(end) {
        map_to_source(ledger, end_line - 1, end)
    } else {
        map_to_source(ledger, end_line, end)
    };

    trace!(
        "mapped view {}..{} (lines {}..{}) to source {}..{}",
        start,
        end,
        start_line,
        end_line,
        source_start,
        source_end
    );

    TextEdit {
        range_offset: source_start,
        range_length: source_end - source_start,
        text: edit.text.clone(),
    }
}
