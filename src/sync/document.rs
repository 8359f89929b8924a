//! An open search-result listing: a buffer plus the session that filters it.

use crate::buffer::{MemoryBuffer, TextBuffer, TextEdit};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::sync::session::Session;
use log::warn;

/// Echo cycles allowed after one user batch before giving up on settling.
const MAX_FEEDBACK_ROUNDS: usize = 3;

/// Owns a buffer and its [`Session`]; the session lives exactly as long as the
/// document is open.
#[derive(Debug)]
pub struct SearchResultDocument<B = MemoryBuffer> {
    buffer: B,
    session: Session,
}

impl SearchResultDocument<MemoryBuffer> {
    /// Open a listing held in memory.
    pub fn open(text: impl Into<String>) -> Self {
        Self::from_buffer(MemoryBuffer::new(text), EngineConfig::default())
    }

    pub fn open_with_config(text: impl Into<String>, config: EngineConfig) -> Self {
        Self::from_buffer(MemoryBuffer::new(text), config)
    }
}

impl<B: TextBuffer> SearchResultDocument<B> {
    pub fn from_buffer(buffer: B, config: EngineConfig) -> Self {
        Self {
            buffer,
            session: Session::with_config(config),
        }
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply a user edit batch and bring the view back in sync.
    ///
    /// Fails only if the buffer rejects the user's own edits. A rejected
    /// materialization is rolled back and logged; the next batch retries.
    pub fn edit(&mut self, edits: &[TextEdit]) -> Result<()> {
        let changes = self.buffer.apply(edits)?;
        self.dispatch(changes);
        Ok(())
    }

    /// Convenience for a single-edit batch.
    pub fn apply_edit(&mut self, edit: TextEdit) -> Result<()> {
        self.edit(std::slice::from_ref(&edit))
    }

    /// Close the document, dropping its session, and hand back the buffer.
    pub fn close(self) -> B {
        self.buffer
    }

    fn dispatch(&mut self, mut changes: Vec<TextEdit>) {
        for _ in 0..=MAX_FEEDBACK_ROUNDS {
            let Some(materialization) = self.session.handle_edit_batch(&self.buffer, &changes) else {
                return;
            };

            match self.buffer.apply(&materialization.edits()) {
                Ok(echo) => {
                    self.session.commit();
                    changes = echo;
                }
                Err(err) => {
                    self.session.rollback();
                    warn!("host rejected materialization: {}", err);
                    return;
                }
            }
        }
        warn!(
            "view did not settle after {} feedback rounds",
            MAX_FEEDBACK_ROUNDS
        );
    }
}
