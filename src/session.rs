// 🗂️ Session - The in-memory subject list and its lifecycle rules
//
// Invariants:
// - at least one subject, always
// - every mutation goes through the subject edit policy
// - the caller persists after each mutation (mutate -> persist -> render)

use crate::aggregate::{aggregate, Summary};
use crate::store::SessionStore;
use crate::subject::{EditOutcome, Subject};
use tracing::{debug, error, info, warn};

/// What the presentation layer should do after Enter in a marks field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAction {
    /// A new subject was appended at this index; focus it
    Appended(usize),
    /// Move focus to this existing row
    FocusRow(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    subjects: Vec<Subject>,
}

impl Session {
    /// Fresh session with a single default subject
    pub fn new() -> Self {
        Session {
            subjects: vec![Subject::new()],
        }
    }

    /// Build from a loaded list. An empty list falls back to the default.
    pub fn from_subjects(subjects: Vec<Subject>) -> Self {
        if subjects.is_empty() {
            return Self::new();
        }
        Session { subjects }
    }

    /// Load the saved session, recovering to a default one on any failure.
    pub fn restore(store: &dyn SessionStore) -> Self {
        match store.load() {
            Ok(Some(subjects)) => {
                info!(count = subjects.len(), "restored saved subjects");
                Self::from_subjects(subjects)
            }
            Ok(None) => {
                debug!("no saved session, starting fresh");
                Self::new()
            }
            Err(e) => {
                warn!(error = %e, "discarding unreadable saved session");
                Self::new()
            }
        }
    }

    /// Fire-and-forget save. Failures are logged; in-memory state stays
    /// authoritative for the rest of the session.
    pub fn persist(&self, store: &dyn SessionStore) {
        if let Err(e) = store.save(&self.subjects) {
            error!(error = %e, "failed to save session");
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Never true; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Subject> {
        self.subjects.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.subjects.iter().position(|s| s.id == id)
    }

    pub fn summary(&self) -> Summary {
        aggregate(&self.subjects)
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Append a default subject and return its index
    pub fn add_subject(&mut self) -> usize {
        self.subjects.push(Subject::new());
        self.subjects.len() - 1
    }

    /// Remove by id. No-op for the last remaining subject or an unknown id.
    pub fn remove_subject(&mut self, id: &str) -> bool {
        if self.subjects.len() <= 1 {
            return false;
        }
        match self.index_of(id) {
            Some(index) => {
                self.subjects.remove(index);
                true
            }
            None => false,
        }
    }

    /// Blank out name and marks of one subject
    pub fn clear_subject(&mut self, id: &str) -> bool {
        match self.find_mut(id) {
            Some(subject) => {
                subject.clear();
                true
            }
            None => false,
        }
    }

    pub fn update_name(&mut self, id: &str, input: &str) -> EditOutcome {
        self.find_mut(id)
            .map(|s| s.set_name(input))
            .unwrap_or(EditOutcome::Rejected)
    }

    pub fn update_credits(&mut self, id: &str, input: &str) -> EditOutcome {
        self.find_mut(id)
            .map(|s| s.set_credits(input))
            .unwrap_or(EditOutcome::Rejected)
    }

    pub fn update_marks(&mut self, id: &str, input: &str) -> EditOutcome {
        self.find_mut(id)
            .map(|s| s.set_marks(input))
            .unwrap_or(EditOutcome::Rejected)
    }

    /// Back to a single default subject
    pub fn reset_all(&mut self) {
        self.subjects = vec![Subject::new()];
    }

    /// Reset and drop the saved entry from the store
    pub fn reset_all_and_forget(&mut self, store: &dyn SessionStore) {
        self.reset_all();
        if let Err(e) = store.clear() {
            error!(error = %e, "failed to clear saved session");
        }
    }

    /// Nothing worth resetting: one subject, nothing typed in it
    pub fn is_pristine(&self) -> bool {
        self.subjects.len() == 1 && self.subjects[0].is_blank()
    }

    /// Enter in the marks field of `row`: append on the last row, otherwise
    /// move to the next one
    pub fn enter_pressed(&mut self, row: usize) -> EnterAction {
        if row + 1 >= self.subjects.len() {
            EnterAction::Appended(self.add_subject())
        } else {
            EnterAction::FocusRow(row + 1)
        }
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Subject> {
        self.subjects.iter_mut().find(|s| s.id == id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, STORAGE_KEY};

    fn filled_session() -> Session {
        let mut session = Session::new();
        let first = session.subjects()[0].id.clone();
        session.update_name(&first, "Maths");
        session.update_marks(&first, "90");

        let index = session.add_subject();
        let second = session.subjects()[index].id.clone();
        session.update_name(&second, "Chemistry");
        session.update_credits(&second, "3");
        session.update_marks(&second, "70");

        session
    }

    #[test]
    fn test_new_session_has_one_default_subject() {
        let session = Session::new();
        assert_eq!(session.len(), 1);
        assert_eq!(session.subjects()[0].credits, 4.0);
        assert!(session.is_pristine());
        assert_eq!(session.summary(), Summary::default());
    }

    #[test]
    fn test_add_subject_appends_default() {
        let mut session = Session::new();
        let index = session.add_subject();
        assert_eq!(index, 1);
        assert_eq!(session.len(), 2);
        assert_eq!(session.subjects()[1].credits, 4.0);
        assert_eq!(session.subjects()[1].marks, None);
        assert_ne!(session.subjects()[0].id, session.subjects()[1].id);
    }

    #[test]
    fn test_cannot_remove_last_subject() {
        let mut session = Session::new();
        let id = session.subjects()[0].id.clone();
        assert!(!session.remove_subject(&id));
        assert_eq!(session.len(), 1);
        assert_eq!(session.subjects()[0].id, id);
    }

    #[test]
    fn test_remove_subject_keeps_order() {
        let mut session = Session::new();
        session.add_subject();
        session.add_subject();
        let ids: Vec<String> = session.subjects().iter().map(|s| s.id.clone()).collect();

        assert!(session.remove_subject(&ids[1]));
        let remaining: Vec<&str> = session.subjects().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(remaining, vec![ids[0].as_str(), ids[2].as_str()]);

        assert!(!session.remove_subject("no-such-id"));
        assert_eq!(session.len(), 2);

        assert!(session.remove_subject(&ids[0]));
        assert!(!session.remove_subject(&ids[2]));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_summary_follows_edits() {
        let mut session = filled_session();
        let summary = session.summary();
        assert_eq!(summary.sgpa_display(), "9.14");
        assert_eq!(summary.total_credits, 7.0);

        let second = session.subjects()[1].id.clone();
        session.clear_subject(&second);
        let summary = session.summary();
        assert_eq!(summary.sgpa, 10.0);
        assert_eq!(summary.total_credits, 4.0);
        assert_eq!(session.subjects()[1].credits, 3.0);
    }

    #[test]
    fn test_rejected_edits_change_nothing() {
        let mut session = filled_session();
        let before = session.clone();
        let id = session.subjects()[0].id.clone();

        assert_eq!(session.update_marks(&id, "101"), EditOutcome::Rejected);
        assert_eq!(session.update_marks(&id, "-3"), EditOutcome::Rejected);
        assert_eq!(session.update_credits(&id, "-1"), EditOutcome::Rejected);
        assert_eq!(session.update_marks("unknown", "50"), EditOutcome::Rejected);
        assert_eq!(session, before);
    }

    #[test]
    fn test_reset_all() {
        let mut session = filled_session();
        assert!(!session.is_pristine());
        session.reset_all();
        assert_eq!(session.len(), 1);
        assert!(session.is_pristine());
    }

    #[test]
    fn test_pristine_ignores_credits_but_not_names() {
        let mut session = Session::new();
        let id = session.subjects()[0].id.clone();
        session.update_credits(&id, "2");
        assert!(session.is_pristine());
        session.update_name(&id, "x");
        assert!(!session.is_pristine());
    }

    #[test]
    fn test_enter_navigation() {
        let mut session = Session::new();
        session.add_subject();

        assert_eq!(session.enter_pressed(0), EnterAction::FocusRow(1));
        assert_eq!(session.len(), 2);

        assert_eq!(session.enter_pressed(1), EnterAction::Appended(2));
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn test_restore_round_trip() {
        let store = MemoryStore::new();
        let session = filled_session();
        session.persist(&store);

        let restored = Session::restore(&store);
        assert_eq!(restored, session);
    }

    #[test]
    fn test_restore_without_saved_data() {
        let store = MemoryStore::new();
        let session = Session::restore(&store);
        assert!(session.is_pristine());
    }

    #[test]
    fn test_restore_recovers_from_corrupt_data() {
        let store = MemoryStore::with_raw("[{\"id\": 12, broken");
        let session = Session::restore(&store);
        assert_eq!(session.len(), 1);
        assert!(session.is_pristine());
    }

    #[test]
    fn test_restore_empty_list_gives_default() {
        let store = MemoryStore::with_raw("[]");
        let session = Session::restore(&store);
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_restore_source_format() {
        // Shape written by the browser version under STORAGE_KEY
        assert_eq!(STORAGE_KEY, "grade-calculator-data");
        let store = MemoryStore::with_raw(
            r#"[{"id":"0b6c","name":"AI","credits":4,"marks":90},{"id":"77aa","name":"","credits":3,"marks":""}]"#,
        );
        let session = Session::restore(&store);
        assert_eq!(session.len(), 2);
        assert_eq!(session.subjects()[0].name, "AI");
        assert_eq!(session.subjects()[1].marks, None);
        assert_eq!(session.summary().total_credits, 4.0);
    }

    #[test]
    fn test_restore_row_without_credits_keeps_list() {
        let store = MemoryStore::with_raw(
            r#"[{"id":"a","name":"Old","marks":80},{"id":"b","name":"AI","credits":4,"marks":90}]"#,
        );
        let session = Session::restore(&store);
        assert_eq!(session.len(), 2);
        assert_eq!(session.subjects()[0].credits, 0.0);
        assert_eq!(session.subjects()[1].name, "AI");
        assert_eq!(session.summary().total_credits, 4.0);
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let store = MemoryStore::new();
        let mut session = filled_session();
        session.persist(&store);

        store.set_fail_writes(true);
        session.add_subject();
        session.persist(&store);

        assert_eq!(session.len(), 3);
        // Store still holds the last good write
        assert_eq!(Session::restore(&store).len(), 2);
    }

    #[test]
    fn test_reset_all_and_forget_clears_store() {
        let store = MemoryStore::new();
        let mut session = filled_session();
        session.persist(&store);

        session.reset_all_and_forget(&store);
        assert!(session.is_pristine());
        assert!(store.raw().is_none());
    }
}
