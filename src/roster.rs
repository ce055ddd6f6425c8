//! The "create class" form: class name plus an editable list of student rows.
//!
//! Submission is a small state machine. [`RosterEditor::begin_submit`]
//! validates and moves the editor to [`Phase::Submitting`], where further
//! submits are rejected; [`RosterEditor::finish_submit`] applies the
//! repository result and returns to [`Phase::Editing`]. [`RosterEditor::submit`]
//! runs the whole cycle against a repository and reports the outcome through
//! exactly one notice.

use thiserror::Error;
use tracing::{info, warn};

use crate::dialog::{Notice, Notifier};
use crate::models::{StudentEntry, StudentField};
use crate::navigation::{Navigator, Route};
use crate::repository::{ClassRepository, RepositoryError};
use crate::validation::{ValidationError, validate_class_name, validate_rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{message}")]
    Repository {
        message: String,
        #[source]
        source: RepositoryError,
    },
    #[error("row {index} does not exist (roster has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },
    #[error("a submission is already in progress")]
    SubmitInProgress,
    #[error("no submission is in progress")]
    NotSubmitting,
}

/// Validated payload handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub students: Vec<StudentEntry>,
    pub dropped_rows: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: String,
    pub name: String,
    pub total_students: usize,
    pub dropped_rows: Vec<usize>,
}

pub fn create_failure_message(err: &RepositoryError) -> String {
    let reason = match err {
        RepositoryError::PermissionDenied(_) => "Please check Firestore database rules.",
        RepositoryError::Unavailable(_) => "Database is currently unavailable.",
        RepositoryError::Unknown(msg) => msg.as_str(),
    };
    format!("Failed to add class. {reason}")
}

/// Puts the editor back into `Editing` when a submit future is dropped mid-call.
struct EditingOnDrop<'a>(&'a mut Phase);

impl Drop for EditingOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = Phase::Editing;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEditor {
    class_name: String,
    rows: Vec<StudentEntry>,
    phase: Phase,
}

impl Default for RosterEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterEditor {
    pub fn new() -> Self {
        Self {
            class_name: String::new(),
            rows: vec![StudentEntry::default()],
            phase: Phase::Editing,
        }
    }

    /// Editor pre-filled from a submitted form. An empty roster becomes one
    /// empty row.
    pub fn with_form(class_name: impl Into<String>, rows: Vec<StudentEntry>) -> Self {
        let rows = if rows.is_empty() {
            vec![StudentEntry::default()]
        } else {
            rows
        };
        Self {
            class_name: class_name.into(),
            rows,
            phase: Phase::Editing,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn rows(&self) -> &[StudentEntry] {
        &self.rows
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_class_name(&mut self, text: impl Into<String>) {
        self.class_name = text.into();
    }

    pub fn add_row(&mut self) {
        self.rows.push(StudentEntry::default());
    }

    /// Returns whether a row was removed. The last remaining row stays, and
    /// an index past the end is ignored.
    pub fn remove_row(&mut self, index: usize) -> bool {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }

    pub fn update_row(
        &mut self,
        index: usize,
        field: StudentField,
        value: impl Into<String>,
    ) -> Result<(), RosterError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(RosterError::RowOutOfRange { index, len })?;
        *row.field_mut(field) = value.into();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.class_name.clear();
        self.rows = vec![StudentEntry::default()];
    }

    pub fn begin_submit(&mut self) -> Result<Submission, RosterError> {
        if self.phase == Phase::Submitting {
            return Err(RosterError::SubmitInProgress);
        }
        let name = validate_class_name(&self.class_name)?.to_string();
        let valid = validate_rows(&self.rows)?;

        if !valid.dropped.is_empty() {
            warn!(class = %name, dropped = ?valid.dropped, "dropping incomplete roster rows");
        }
        self.phase = Phase::Submitting;
        Ok(Submission {
            name,
            students: valid.students,
            dropped_rows: valid.dropped,
        })
    }

    pub fn finish_submit(
        &mut self,
        submission: Submission,
        result: Result<String, RepositoryError>,
    ) -> Result<Created, RosterError> {
        if self.phase != Phase::Submitting {
            return Err(RosterError::NotSubmitting);
        }
        self.phase = Phase::Editing;
        self.apply_result(submission, result)
    }

    /// Leaves `Submitting` without touching the form, e.g. when the user
    /// navigates away while the call is in flight.
    pub fn abandon_submit(&mut self) {
        self.phase = Phase::Editing;
    }

    fn apply_result(
        &mut self,
        submission: Submission,
        result: Result<String, RepositoryError>,
    ) -> Result<Created, RosterError> {
        match result {
            Ok(id) => {
                self.reset();
                Ok(Created {
                    id,
                    total_students: submission.students.len(),
                    name: submission.name,
                    dropped_rows: submission.dropped_rows,
                })
            }
            Err(source) => Err(RosterError::Repository {
                message: create_failure_message(&source),
                source,
            }),
        }
    }

    pub async fn submit(
        &mut self,
        repo: &dyn ClassRepository,
        notifier: &dyn Notifier,
        navigator: &dyn Navigator,
    ) -> Result<Created, RosterError> {
        let submission = match self.begin_submit() {
            Ok(submission) => submission,
            Err(RosterError::Validation(err)) => {
                notifier.notify(Notice::error(err.user_message()));
                return Err(err.into());
            }
            Err(err) => return Err(err),
        };

        info!(class = %submission.name, students = submission.students.len(), "submitting class");
        let result = {
            let _editing = EditingOnDrop(&mut self.phase);
            repo.create_class(submission.name.clone(), submission.students.clone())
                .await
        };

        match self.apply_result(submission, result) {
            Ok(created) => {
                info!(id = %created.id, class = %created.name, "class created");
                notifier.notify(Notice::success(
                    "Success!",
                    format!(
                        "Class \"{}\" with {} students added successfully!",
                        created.name, created.total_students
                    ),
                ));
                navigator.navigate(Route::Home);
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "class creation failed");
                notifier.notify(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::dialog::{NoticeKind, RecordingNotifier};
    use crate::models::ClassRecord;
    use crate::navigation::RecordingNavigator;
    use crate::repository::MemoryRepository;

    fn filled(editor: &mut RosterEditor, index: usize, id: &str, name: &str, email: &str) {
        editor.update_row(index, StudentField::Id, id).unwrap();
        editor.update_row(index, StudentField::Name, name).unwrap();
        editor.update_row(index, StudentField::Email, email).unwrap();
    }

    #[test]
    fn test_remove_last_remaining_row_is_noop() {
        let mut editor = RosterEditor::new();
        filled(&mut editor, 0, "S1", "Alice", "a@x.com");
        let before = editor.clone();

        assert!(!editor.remove_row(0));
        assert!(!editor.remove_row(5));
        assert_eq!(editor, before);
    }

    #[test]
    fn test_add_then_remove_last_restores_roster() {
        let mut editor = RosterEditor::new();
        filled(&mut editor, 0, "S1", "Alice", "a@x.com");
        editor.add_row();
        filled(&mut editor, 1, "S2", "Bob", "b@x.com");
        let before = editor.rows().to_vec();

        editor.add_row();
        assert!(editor.remove_row(editor.rows().len() - 1));
        assert_eq!(editor.rows(), before.as_slice());
    }

    #[test]
    fn test_remove_row_out_of_range_is_ignored() {
        let mut editor = RosterEditor::new();
        editor.add_row();
        assert!(!editor.remove_row(2));
        assert_eq!(editor.rows().len(), 2);
    }

    #[test]
    fn test_update_row_is_field_scoped() {
        let mut editor = RosterEditor::new();
        editor.add_row();
        editor.update_row(1, StudentField::Email, "b@x.com").unwrap();

        assert_eq!(editor.rows()[0], StudentEntry::default());
        assert_eq!(editor.rows()[1], StudentEntry::new("", "", "b@x.com"));
        assert_eq!(
            editor.update_row(2, StudentField::Id, "x"),
            Err(RosterError::RowOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut editor = RosterEditor::new();
        editor.set_class_name("CS101");
        editor.add_row();
        filled(&mut editor, 1, "S2", "Bob", "b@x.com");

        editor.reset();
        assert_eq!(editor, RosterEditor::new());
    }

    #[test]
    fn test_begin_submit_rejects_reentry() {
        let mut editor = RosterEditor::new();
        editor.set_class_name("CS101");
        filled(&mut editor, 0, "S1", "Alice", "a@x.com");

        let submission = editor.begin_submit().unwrap();
        assert_eq!(editor.phase(), Phase::Submitting);
        assert_eq!(editor.begin_submit(), Err(RosterError::SubmitInProgress));

        let created = editor
            .finish_submit(submission, Ok("id-1".into()))
            .unwrap();
        assert_eq!(created.total_students, 1);
        assert_eq!(editor, RosterEditor::new());
    }

    #[test]
    fn test_finish_without_begin_is_rejected() {
        let mut editor = RosterEditor::new();
        let submission = Submission {
            name: "x".into(),
            students: vec![],
            dropped_rows: vec![],
        };
        assert_eq!(
            editor.finish_submit(submission, Ok("id".into())),
            Err(RosterError::NotSubmitting)
        );
    }

    #[test]
    fn test_abandon_keeps_fields() {
        let mut editor = RosterEditor::new();
        editor.set_class_name("CS101");
        filled(&mut editor, 0, "S1", "Alice", "a@x.com");

        editor.begin_submit().unwrap();
        editor.abandon_submit();
        assert_eq!(editor.phase(), Phase::Editing);
        assert_eq!(editor.class_name(), "CS101");
        assert!(editor.begin_submit().is_ok());
    }

    #[tokio::test]
    async fn test_whitespace_name_never_reaches_repository() {
        let repo = MemoryRepository::new();
        let notifier = RecordingNotifier::default();
        let navigator = RecordingNavigator::new();
        let mut editor = RosterEditor::new();
        editor.set_class_name("  ");
        filled(&mut editor, 0, "S1", "Alice", "a@x.com");

        let err = editor.submit(&repo, &notifier, &navigator).await.unwrap_err();
        assert_eq!(err, RosterError::Validation(ValidationError::EmptyClassName));
        assert_eq!(repo.calls(), 0);
        assert_eq!(notifier.notices().len(), 1);
        assert_eq!(
            notifier.last_notice().unwrap().text,
            "Please enter a class name"
        );
        assert!(navigator.current().is_none());
    }

    #[tokio::test]
    async fn test_only_invalid_rows_never_reaches_repository() {
        let repo = MemoryRepository::new();
        let notifier = RecordingNotifier::default();
        let navigator = RecordingNavigator::new();
        let mut editor = RosterEditor::new();
        editor.set_class_name("CS101");
        filled(&mut editor, 0, "", "Bob", "b@x.com");

        let err = editor.submit(&repo, &notifier, &navigator).await.unwrap_err();
        assert_eq!(err, RosterError::Validation(ValidationError::NoValidStudents));
        assert_eq!(err.to_string(), "no valid students");
        assert_eq!(repo.calls(), 0);
        assert_eq!(editor.class_name(), "CS101");
    }

    #[tokio::test]
    async fn test_submit_persists_only_valid_rows() {
        let repo = MemoryRepository::new();
        let notifier = RecordingNotifier::default();
        let navigator = RecordingNavigator::new();
        let mut editor = RosterEditor::new();
        editor.set_class_name("CS101");
        filled(&mut editor, 0, "S1", "Alice", "a@x.com");
        editor.add_row();

        let created = editor.submit(&repo, &notifier, &navigator).await.unwrap();
        assert_eq!(created.total_students, 1);
        assert_eq!(created.dropped_rows, vec![1]);

        let stored: Vec<ClassRecord> = repo.snapshot().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, created.id);
        assert_eq!(stored[0].name, "CS101");
        assert_eq!(stored[0].students, vec![StudentEntry::new("S1", "Alice", "a@x.com")]);
        assert_eq!(stored[0].total_students, 1);

        assert_eq!(editor, RosterEditor::new());
        assert_eq!(navigator.current(), Some(Route::Home));
        let notice = notifier.last_notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(
            notice.text,
            "Class \"CS101\" with 1 students added successfully!"
        );
    }

    #[tokio::test]
    async fn test_repository_failure_keeps_form() {
        let repo = MemoryRepository::new();
        let notifier = RecordingNotifier::default();
        let navigator = RecordingNavigator::new();
        let mut editor = RosterEditor::new();
        editor.set_class_name("CS101");
        filled(&mut editor, 0, "S1", "Alice", "a@x.com");
        let before = editor.clone();

        for (failure, text) in [
            (
                RepositoryError::PermissionDenied("denied".into()),
                "Failed to add class. Please check Firestore database rules.",
            ),
            (
                RepositoryError::Unavailable("offline".into()),
                "Failed to add class. Database is currently unavailable.",
            ),
            (
                RepositoryError::Unknown("quota exceeded".into()),
                "Failed to add class. quota exceeded",
            ),
        ] {
            repo.fail_with(Some(failure.clone())).await;
            let err = editor.submit(&repo, &notifier, &navigator).await.unwrap_err();

            assert!(matches!(
                err,
                RosterError::Repository { ref source, .. } if *source == failure
            ));
            assert_eq!(notifier.last_notice().unwrap().text, text);
            assert_eq!(editor, before);
        }
        assert_eq!(notifier.notices().len(), 3);
        assert!(navigator.current().is_none());
    }

    struct PendingRepository;

    #[async_trait]
    impl ClassRepository for PendingRepository {
        async fn list_classes(&self) -> Result<Vec<ClassRecord>, RepositoryError> {
            std::future::pending().await
        }

        async fn create_class(
            &self,
            _name: String,
            _students: Vec<StudentEntry>,
        ) -> Result<String, RepositoryError> {
            std::future::pending().await
        }

        async fn delete_class(&self, _id: &str) -> Result<(), RepositoryError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_dropped_submit_returns_to_editing() {
        let notifier = RecordingNotifier::default();
        let navigator = RecordingNavigator::new();
        let mut editor = RosterEditor::new();
        editor.set_class_name("CS101");
        filled(&mut editor, 0, "S1", "Alice", "a@x.com");
        let before = editor.clone();

        tokio::select! {
            biased;
            _ = editor.submit(&PendingRepository, &notifier, &navigator) => {
                panic!("pending repository resolved");
            }
            _ = std::future::ready(()) => {}
        }

        assert_eq!(editor, before);
        assert!(notifier.notices().is_empty());
    }
}
