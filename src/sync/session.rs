//! Per-buffer synchronization between the filtered view and its source.
//!
//! A [`Session`] keeps the unfiltered snapshot and the ledger of the lines the
//! view currently hides. Each change batch from the host goes through
//! [`Session::handle_edit_batch`]: user edits are written back to the snapshot
//! through the ledger, the snapshot is projected again with the filters found in
//! the view's header region, and the edits needed to bring the view up to date
//! are returned for the host to apply.
//!
//! The returned [`Materialization`] is staged until the host reports back:
//! [`Session::commit`] after a successful apply, [`Session::rollback`] if the
//! host rejected it. After a commit the next batch is the echo of the engine's
//! own edits and is not written back. A rollback only undoes the
//! materialization; the user's edits stay written back to the source.

use crate::buffer::memory::apply_batch;
use crate::buffer::{LineIndex, TextBuffer, TextEdit};
use crate::config::EngineConfig;
use crate::engine::filter::{first_file_header, parse_filters_with_prefix, FilterSet};
use crate::engine::ledger::Ledger;
use crate::engine::mapper::map_edit;
use crate::engine::projection::project;
use log::{debug, trace, warn};

/// Lifecycle of a session. Closing the owning document drops the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No filter has changed the view yet; the buffer is the source
    Unfiltered,
    /// The view diverges from the snapshot
    FilteringActive,
}

/// Edits a cycle asks the host to apply, all against the current buffer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialization {
    /// One-time marker appended to the first line when filtering starts
    pub marker: Option<TextEdit>,
    /// Replacement of the view's result region with the new projection
    pub replacement: Option<TextEdit>,
}

impl Materialization {
    /// Edits in document order, ready for a single host batch.
    pub fn edits(&self) -> Vec<TextEdit> {
        self.marker
            .iter()
            .chain(self.replacement.iter())
            .cloned()
            .collect()
    }
}

/// A source snapshot and the ledger of one view of it.
#[derive(Debug)]
struct SourceState {
    snapshot: String,
    ledger: Ledger,
}

impl SourceState {
    /// The view is the whole source.
    fn unfiltered(text: &str) -> Self {
        Self {
            snapshot: text.to_owned(),
            ledger: Ledger::default(),
        }
    }
}

/// Result of a cycle waiting for the host to apply its materialization.
#[derive(Debug)]
struct StagedCycle {
    /// Source and ledger once the materialization is applied
    materialized: SourceState,
    /// Source and ledger for the buffer as the user left it
    written: SourceState,
}

/// Synchronization state for one open listing.
#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    state: SessionState,
    snapshot: Option<String>,
    ledger: Ledger,
    /// Set when the last committed cycle wrote to the buffer
    feedback: bool,
    /// Buffer text as of the end of the previous batch
    last_view: Option<String>,
    staged: Option<StagedCycle>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            state: SessionState::Unfiltered,
            snapshot: None,
            ledger: Ledger::default(),
            feedback: false,
            last_view: None,
            staged: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Unfiltered source text, once the buffer has been observed.
    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn has_staged_cycle(&self) -> bool {
        self.staged.is_some()
    }

    /// Hidden snapshot lines as `(line number, text)`.
    pub fn hidden_lines(&self) -> Vec<(usize, &str)> {
        let Some(snapshot) = self.snapshot.as_deref() else {
            return Vec::new();
        };
        let base_offset = self.ledger.base_offset();
        self.ledger
            .entries()
            .iter()
            .zip(self.ledger.hidden_source_lines())
            .filter_map(|(removed, line)| {
                let start = base_offset + removed.offset;
                let text = snapshot.get(start..start + removed.length)?;
                Some((line, text))
            })
            .collect()
    }

    /// Process one change batch the host reported for `buffer`.
    ///
    /// `buffer` must already contain the batch. Returns the edits to apply, if
    /// the view has to change; the session then waits for `commit` or `rollback`.
    pub fn handle_edit_batch<B>(&mut self, buffer: &B, batch: &[TextEdit]) -> Option<Materialization>
    where
        B: TextBuffer + ?Sized,
    {
        if let Some(staged) = self.staged.take() {
            warn!("previous materialization was never confirmed; keeping the written-back source");
            self.restore(staged.written);
        }

        let current = buffer.text();
        let pre_view = self.last_view.replace(current.to_owned());
        let feedback = std::mem::take(&mut self.feedback);
        let marker = self.config.marker_suffix.as_str();
        let started = buffer.line(0).is_some_and(|line| line.ends_with(marker));

        let written = match (&self.snapshot, pre_view) {
            _ if !started => SourceState::unfiltered(current),
            (Some(snapshot), _) if feedback => SourceState {
                snapshot: snapshot.clone(),
                ledger: self.ledger.clone(),
            },
            (Some(snapshot), Some(pre_view)) => {
                write_back(snapshot, &self.ledger, &pre_view, batch)
            }
            _ => {
                debug!("buffer already carries the filter marker; adopting it as the source");
                SourceState::unfiltered(current)
            }
        };
        let mut snapshot = written.snapshot.clone();

        let filters = FilterSet::new(parse_filters_with_prefix(
            current.split('\n'),
            &self.config.filename_prefix,
        ));

        let marker_edit = if !started && !filters.is_empty() {
            let offset = buffer.line(0).map_or(0, str::len);
            snapshot.insert_str(offset, marker);
            Some(TextEdit::insert(offset, marker))
        } else {
            None
        };

        let (replacement, ledger) = {
            let lines: Vec<&str> = snapshot.split('\n').collect();
            let base_line = first_file_header(lines.iter().copied()).unwrap_or(lines.len());
            let base_offset = lines[..base_line]
                .iter()
                .map(|line| line.len() + 1)
                .sum::<usize>()
                .min(snapshot.len());
            let projection = project(&lines[base_line..], &filters);
            let view_text = (base_line < lines.len()).then(|| projection.text());
            (
                replacement_edit(
                    buffer,
                    &lines[..base_line],
                    view_text.as_deref(),
                    marker_edit.is_some(),
                ),
                Ledger::new(projection.removed, base_line, base_offset),
            )
        };

        debug!(
            "cycle: started={} feedback={} filters={} hidden={} marker={} replace={}",
            started,
            feedback,
            filters.len(),
            ledger.len(),
            marker_edit.is_some(),
            replacement.is_some()
        );

        let materialized = SourceState { snapshot, ledger };
        if marker_edit.is_none() && replacement.is_none() {
            self.store(materialized, started, false);
            return None;
        }

        self.staged = Some(StagedCycle {
            materialized,
            written,
        });
        Some(Materialization {
            marker: marker_edit,
            replacement,
        })
    }

    /// The host applied the last materialization.
    pub fn commit(&mut self) {
        match self.staged.take() {
            Some(staged) => self.store(staged.materialized, true, true),
            None => warn!("commit without a staged materialization"),
        }
    }

    /// The host rejected the last materialization.
    ///
    /// The buffer still shows the user's edits over the previous view, so the
    /// source keeps them and the ledger describes that unchanged view.
    pub fn rollback(&mut self) {
        if let Some(staged) = self.staged.take() {
            warn!("materialization rejected; keeping the written-back source");
            self.restore(staged.written);
        }
    }

    fn restore(&mut self, written: SourceState) {
        self.snapshot = Some(written.snapshot);
        self.ledger = written.ledger;
        self.feedback = false;
    }

    fn store(&mut self, source: SourceState, filtering: bool, wrote: bool) {
        self.snapshot = Some(source.snapshot);
        self.ledger = source.ledger;
        self.state = if filtering {
            SessionState::FilteringActive
        } else {
            SessionState::Unfiltered
        };
        self.feedback = wrote;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a batch of view edits to the snapshot through the ledger.
///
/// Returns the patched snapshot with the ledger carried through the same edits.
fn write_back(snapshot: &str, ledger: &Ledger, pre_view: &str, batch: &[TextEdit]) -> SourceState {
    let view = LineIndex::new(pre_view);
    let len = snapshot.len();

    let mapped: Vec<TextEdit> = batch
        .iter()
        .filter_map(|edit| {
            let mapped = map_edit(ledger, &view, edit);
            let start = mapped.range_offset.min(len);
            let end = mapped.range_end().min(len);
            if !snapshot.is_char_boundary(start) || !snapshot.is_char_boundary(end) {
                warn!(
                    "skipping edit at view offset {}: maps inside a character of the source",
                    edit.range_offset
                );
                return None;
            }
            trace!("write back {:?} as {}..{}", edit.text, start, end);
            Some(TextEdit::replace(start, end - start, mapped.text))
        })
        .collect();

    let mut patched = snapshot.to_owned();
    if let Err(err) = apply_batch(&mut patched, &mapped) {
        warn!("could not write view edits back to the source: {}", err);
        return SourceState {
            snapshot: snapshot.to_owned(),
            ledger: ledger.clone(),
        };
    }
    SourceState {
        ledger: ledger.carry_through(snapshot, &mapped),
        snapshot: patched,
    }
}

/// Edit turning `buffer` into the snapshot's header region followed by `view_text`.
///
/// Normally the header regions match and the edit spans the result region,
/// from the first file header through the end of the buffer. When they differ
/// the edit starts at the first differing header line instead. The first line is
/// skipped while a marker edit for it is pending.
fn replacement_edit<B>(
    buffer: &B,
    header: &[&str],
    view_text: Option<&str>,
    skip_first_line: bool,
) -> Option<TextEdit>
where
    B: TextBuffer + ?Sized,
{
    let current = buffer.text();
    let first = usize::from(skip_first_line).min(header.len());
    let start_line = (first..header.len())
        .find(|&line| buffer.line(line) != Some(header[line]))
        .unwrap_or(header.len());

    let mut desired: Vec<&str> = header[start_line..].to_vec();
    if let Some(view_text) = view_text {
        desired.extend(view_text.split('\n'));
    }
    let desired = desired.join("\n");

    let (start, text) = match buffer.line_start(start_line) {
        Some(start) => (start, desired),
        // The buffer ends before the region; open a new line for it
        None if start_line > 0 && !desired.is_empty() => {
            (current.len(), format!("\n{}", desired))
        }
        None => (current.len(), desired),
    };

    if current[start..] == text {
        return None;
    }
    Some(TextEdit::replace(start, current.len() - start, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryBuffer;

    const LISTING: &str = "2 results - 2 files

a.rs:
  1: keep this

b.rs:
  2: drop this";

    /// Apply a user batch, run the cycle and apply/commit its output.
    fn cycle(session: &mut Session, buffer: &mut MemoryBuffer, edits: &[TextEdit]) {
        let changes = buffer.apply(edits).unwrap();
        if let Some(materialization) = session.handle_edit_batch(buffer, &changes) {
            let echo = buffer.apply(&materialization.edits()).unwrap();
            session.commit();
            assert!(session.handle_edit_batch(buffer, &echo).is_none());
        }
    }

    fn opened() -> (Session, MemoryBuffer) {
        let mut session = Session::new();
        let mut buffer = MemoryBuffer::default();
        cycle(&mut session, &mut buffer, &[TextEdit::insert(0, LISTING)]);
        (session, buffer)
    }

    #[test]
    fn unfiltered_buffer_is_its_own_snapshot() {
        let (session, buffer) = opened();
        assert_eq!(session.state(), SessionState::Unfiltered);
        assert_eq!(session.snapshot(), Some(buffer.text()));
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn first_filter_adds_marker_and_replaces_results() {
        let (mut session, mut buffer) = opened();
        let changes = buffer.apply(&[TextEdit::insert(20, "+keep")]).unwrap();
        let materialization = session.handle_edit_batch(&buffer, &changes).unwrap();

        assert_eq!(materialization.marker, Some(TextEdit::insert(19, " (Filtered)")));
        let replacement = materialization.replacement.clone().unwrap();
        assert_eq!(replacement.text, "a.rs:\n  1: keep this\n");
        assert_eq!(session.state(), SessionState::Unfiltered);
        assert!(session.has_staged_cycle());

        buffer.apply(&materialization.edits()).unwrap();
        session.commit();
        assert_eq!(session.state(), SessionState::FilteringActive);
        assert_eq!(
            buffer.text(),
            "2 results - 2 files (Filtered)\n+keep\na.rs:\n  1: keep this\n"
        );
        assert_eq!(
            session.hidden_lines(),
            vec![(5, "b.rs:"), (6, "  2: drop this")]
        );
    }

    #[test]
    fn echo_of_own_edits_is_not_written_back() {
        let (mut session, mut buffer) = opened();
        cycle(&mut session, &mut buffer, &[TextEdit::insert(20, "+keep")]);
        let snapshot = session.snapshot().unwrap().to_string();
        assert!(snapshot.contains("b.rs:"));
        assert!(snapshot.starts_with("2 results - 2 files (Filtered)\n+keep\n"));
        assert!(!session.has_staged_cycle());
    }

    #[test]
    fn user_edit_in_view_reaches_hidden_aware_offset() {
        let (mut session, mut buffer) = opened();
        cycle(&mut session, &mut buffer, &[TextEdit::insert(20, "+keep")]);
        // "  1: keep this" is line 3 of the view
        let offset = buffer.line_start(3).unwrap() + 5;
        cycle(&mut session, &mut buffer, &[TextEdit::insert(offset, "really ")]);

        assert_eq!(buffer.line(3), Some("  1: really keep this"));
        assert!(session
            .snapshot()
            .unwrap()
            .contains("  1: really keep this\n\nb.rs:\n  2: drop this"));
    }

    #[test]
    fn removing_filter_restores_full_source() {
        let (mut session, mut buffer) = opened();
        cycle(&mut session, &mut buffer, &[TextEdit::insert(20, "+keep")]);
        let filter_start = buffer.line_start(1).unwrap();
        cycle(&mut session, &mut buffer, &[TextEdit::delete(filter_start, 5)]);

        assert_eq!(
            buffer.text(),
            "2 results - 2 files (Filtered)\n\na.rs:\n  1: keep this\n\nb.rs:\n  2: drop this"
        );
        assert!(session.ledger().is_empty());
        assert_eq!(session.state(), SessionState::FilteringActive);
    }

    #[test]
    fn rollback_keeps_the_unmaterialized_buffer_as_source() {
        let (mut session, mut buffer) = opened();
        let changes = buffer.apply(&[TextEdit::insert(20, "+keep")]).unwrap();
        assert!(session.handle_edit_batch(&buffer, &changes).is_some());
        session.rollback();

        assert_eq!(session.snapshot(), Some(buffer.text()));
        assert!(session.ledger().is_empty());
        assert_eq!(session.state(), SessionState::Unfiltered);
        assert!(!session.has_staged_cycle());
    }

    /// View of `LISTING` under `-keep`: the whole `a.rs` group is hidden above `b.rs:`.
    fn filtered_past_hidden_group() -> (Session, MemoryBuffer) {
        let (mut session, mut buffer) = opened();
        cycle(&mut session, &mut buffer, &[TextEdit::insert(20, "-keep")]);
        assert_eq!(
            buffer.text(),
            "2 results - 2 files (Filtered)\n-keep\nb.rs:\n  2: drop this"
        );
        (session, buffer)
    }

    #[test]
    fn rollback_keeps_written_back_user_edits() {
        let (mut session, mut buffer) = filtered_past_hidden_group();
        // A new filter line plus an edit that the next projection hides
        let filter_end = buffer.line_start(2).unwrap() - 1;
        let result = buffer.line_start(3).unwrap() + "  2: drop ".len();
        let changes = buffer
            .apply(&[
                TextEdit::insert(filter_end, "\n-none"),
                TextEdit::replace(result, 4, "keep"),
            ])
            .unwrap();
        assert!(session.handle_edit_batch(&buffer, &changes).is_some());
        session.rollback();

        let snapshot = session.snapshot().unwrap();
        assert!(snapshot.contains("-keep\n-none\na.rs:\n  1: keep this\n\nb.rs:\n  2: drop keep"));
        assert_eq!(
            session.hidden_lines(),
            vec![(3, "a.rs:"), (4, "  1: keep this"), (5, "")]
        );

        // Later edits still map past the hidden group
        let header = buffer.line_start(3).unwrap();
        cycle(&mut session, &mut buffer, &[TextEdit::insert(header, "X")]);
        let snapshot = session.snapshot().unwrap();
        assert!(snapshot.contains("  1: keep this\n\nXb.rs:\n  2: drop keep"));
        assert!(snapshot.starts_with("2 results - 2 files (Filtered)\n-keep\n-none\n"));
    }

    #[test]
    fn unconfirmed_cycle_keeps_written_back_user_edits() {
        let (mut session, mut buffer) = filtered_past_hidden_group();
        let result = buffer.line_start(3).unwrap() + "  2: drop ".len();
        let changes = buffer.apply(&[TextEdit::replace(result, 4, "keep")]).unwrap();
        assert!(session.handle_edit_batch(&buffer, &changes).is_some());

        // The host never reports back and sends the next batch
        let changes = buffer.apply(&[TextEdit::insert(0, "")]).unwrap();
        session.handle_edit_batch(&buffer, &changes);
        assert!(session.snapshot().unwrap().ends_with("b.rs:\n  2: drop keep"));
    }

    #[test]
    fn reentry_adopts_marked_buffer() {
        let mut session = Session::new();
        let mut buffer = MemoryBuffer::new("hits (Filtered)\n+x\na.rs:\n  1: x");
        let changes = buffer.apply(&[TextEdit::insert(0, "")]).unwrap();
        assert!(session.handle_edit_batch(&buffer, &changes).is_none());
        assert_eq!(session.state(), SessionState::FilteringActive);
        assert_eq!(session.snapshot(), Some(buffer.text()));
    }

    #[test]
    fn filters_that_hide_nothing_still_mark_the_buffer() {
        let (mut session, mut buffer) = opened();
        let changes = buffer.apply(&[TextEdit::insert(20, "+this")]).unwrap();
        let materialization = session.handle_edit_batch(&buffer, &changes).unwrap();
        assert!(materialization.marker.is_some());
        assert!(materialization.replacement.is_none());
    }

    #[test]
    fn replacement_after_empty_view_keeps_header_line_intact() {
        let mut buffer = MemoryBuffer::new("hits (Filtered)\n+zzz");
        let header = ["hits (Filtered)", "+zzz"];
        let edit = replacement_edit(&buffer, &header, Some("a.rs:\n  1: x"), false).unwrap();
        buffer.apply(&[edit]).unwrap();
        assert_eq!(buffer.text(), "hits (Filtered)\n+zzz\na.rs:\n  1: x");
    }

    #[test]
    fn replacement_is_skipped_when_view_matches() {
        let buffer = MemoryBuffer::new("hits\n+x\na.rs:\n  1: x");
        let header = ["hits", "+x"];
        assert!(replacement_edit(&buffer, &header, Some("a.rs:\n  1: x"), false).is_none());
    }

    #[test]
    fn diverging_header_region_is_rewritten_from_first_difference() {
        // the view lost a line that the source now keeps above its first header
        let buffer = MemoryBuffer::new("hits\n+x\nold:x\nb.rs:\n  2: x");
        let header = ["hits", "+x", "old:x", "  1: hidden"];
        let edit = replacement_edit(&buffer, &header, Some("b.rs:\n  2: x"), false).unwrap();
        assert_eq!(edit.range_offset, "hits\n+x\nold:x\n".len());
        assert_eq!(edit.text, "  1: hidden\nb.rs:\n  2: x");
    }

    #[test]
    fn result_region_starting_with_context_is_not_duplicated() {
        let buffer = MemoryBuffer::new("hits\n+x\n  context\n");
        let header = ["hits", "+x"];
        assert!(replacement_edit(&buffer, &header, Some("  context\n"), false).is_none());
    }
}
