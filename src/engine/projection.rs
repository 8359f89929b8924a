//! Forward projection: source result region to filtered view.
//!
//! The walk keeps lines tentatively and retracts them when a file group turns
//! out to have no surviving result: a header immediately followed by another
//! header, together with the blank separators between them, never reaches the
//! view.

use crate::engine::classify::{classify, LineKind};
use crate::engine::filter::FilterSet;
use crate::engine::ledger::RemovedLine;

/// Lines kept for the view and the lines hidden from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection<'a> {
    pub retained: Vec<&'a str>,
    pub removed: Vec<RemovedLine>,
}

impl Projection<'_> {
    /// View text for the projected region, lines joined by `\n`.
    pub fn text(&self) -> String {
        self.retained.join("\n")
    }
}

/// Project `lines` (the result region of a listing) through `filters`.
pub fn project<'a>(lines: &[&'a str], filters: &FilterSet) -> Projection<'a> {
    if filters.is_empty() {
        return Projection {
            retained: lines.to_vec(),
            removed: Vec::new(),
        };
    }

    let mut kept: Vec<usize> = Vec::with_capacity(lines.len());
    // Trailing kept lines that go away if the current group gets no result
    let mut pending_remove = 0usize;
    let mut hide_until_next_header = false;

    for (index, line) in lines.iter().enumerate() {
        match classify(line) {
            LineKind::FileHeader => {
                retract(&mut kept, &mut pending_remove);
                hide_until_next_header = !filters.passes_filename(line);
                if !hide_until_next_header {
                    kept.push(index);
                    pending_remove = 1;
                }
            }
            LineKind::ResultLine => {
                if !hide_until_next_header && filters.passes_content(line) {
                    kept.push(index);
                    pending_remove = 0;
                }
            }
            LineKind::Other => {
                kept.push(index);
                if pending_remove > 0 || hide_until_next_header {
                    if line.is_empty() {
                        pending_remove += 1;
                    } else {
                        pending_remove = 0;
                    }
                }
            }
        }
    }
    retract(&mut kept, &mut pending_remove);

    let retained = kept.iter().map(|&i| lines[i]).collect();
    let removed = removed_lines(lines, &kept);
    Projection { retained, removed }
}

fn retract(kept: &mut Vec<usize>, pending_remove: &mut usize) {
    let keep = kept.len().saturating_sub(*pending_remove);
    kept.truncate(keep);
    *pending_remove = 0;
}

/// Every line not in `kept` (sorted), with its offset in the `\n`-joined region.
fn removed_lines(lines: &[&str], kept: &[usize]) -> Vec<RemovedLine> {
    let mut removed = Vec::with_capacity(lines.len() - kept.len());
    let mut next_kept = kept.iter().copied().peekable();
    let mut offset = 0usize;

    for (index, line) in lines.iter().enumerate() {
        if next_kept.peek() == Some(&index) {
            next_kept.next();
        } else {
            removed.push(RemovedLine {
                line: index,
                offset,
                length: line.len(),
            });
        }
        offset += line.len() + 1;
    }
    removed
}
