//! Explicit per-session state.
//!
//! Everything that used to be ambient (which book is active, the running
//! conversation, which view the user is in) lives in a [`Session`] value
//! passed to each operation. Construct one per session; there is no hidden
//! global.

use crate::qa::Conversation;

/// The view the presentation layer is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Browsing the curated shelf.
    #[default]
    Library,
    /// Searching for a book.
    Search,
    /// Uploading a local document.
    Upload,
    /// Reading and asking questions.
    Reader,
}

/// Request context for one user session.
#[derive(Debug, Default)]
pub struct Session {
    /// Id of the currently active document, if any.
    pub active_document: Option<String>,
    /// Append-only question/answer log for this session.
    pub conversation: Conversation,
    /// Current view.
    pub view: View,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a document active and move to the reader view.
    pub fn activate(&mut self, document_id: impl Into<String>) {
        self.active_document = Some(document_id.into());
        self.view = View::Reader;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_has_no_document_and_empty_log() {
        let session = Session::new();
        assert!(session.active_document.is_none());
        assert!(session.conversation.is_empty());
        assert_eq!(session.view, View::Library);
    }

    #[test]
    fn activate_sets_document_and_view() {
        let mut session = Session::new();
        session.activate("pg84");
        assert_eq!(session.active_document.as_deref(), Some("pg84"));
        assert_eq!(session.view, View::Reader);
    }
}
