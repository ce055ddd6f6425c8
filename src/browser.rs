use tracing::{error, info, warn};

use crate::dialog::{Confirmation, Notice, Notifier};
use crate::models::ClassRecord;
use crate::navigation::{Navigator, Route};
use crate::repository::{ClassRepository, RepositoryError};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load classes. Please check the logs for details.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete class. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserStatus {
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// One click in the class list. A click is exactly one of these, so deleting
/// never also opens the class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    Open { id: String },
    Delete { id: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    Failed(RepositoryError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Opened,
    Delete(DeleteOutcome),
}

pub fn delete_prompt(name: &str) -> Confirmation {
    Confirmation {
        title: "Are you sure?".to_string(),
        text: format!("Do you want to delete \"{name}\" class? This action cannot be undone!"),
        confirm_label: "Yes, delete it!".to_string(),
        cancel_label: "Cancel".to_string(),
    }
}

/// The class list screen.
#[derive(Debug, Clone)]
pub struct ClassBrowser {
    classes: Vec<ClassRecord>,
    status: BrowserStatus,
    selected: Option<String>,
}

impl Default for ClassBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassBrowser {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            status: BrowserStatus::Idle,
            selected: None,
        }
    }

    pub fn classes(&self) -> &[ClassRecord] {
        &self.classes
    }

    pub fn status(&self) -> &BrowserStatus {
        &self.status
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn begin_refresh(&mut self) {
        self.status = BrowserStatus::Loading;
    }

    /// On failure the previously loaded list stays on screen.
    pub fn finish_refresh(
        &mut self,
        result: Result<Vec<ClassRecord>, RepositoryError>,
    ) -> Result<usize, RepositoryError> {
        match result {
            Ok(classes) => {
                if classes.is_empty() {
                    info!("No classes found");
                } else {
                    info!(count = classes.len(), "Successfully loaded classes");
                }
                self.classes = classes;
                self.status = BrowserStatus::Ready;
                Ok(self.classes.len())
            }
            Err(err) => {
                self.status = BrowserStatus::Error(LOAD_FAILED_MESSAGE.to_string());
                Err(err)
            }
        }
    }

    pub async fn refresh(
        &mut self,
        repo: &dyn ClassRepository,
        notifier: &dyn Notifier,
    ) -> Result<usize, RepositoryError> {
        self.begin_refresh();
        let result = repo.list_classes().await;
        self.finish_refresh(result).inspect_err(|err| {
            if let RepositoryError::PermissionDenied(_) = err {
                error!(error = %err, "Permission denied. Please check Firestore rules.");
            } else {
                error!(error = %err, "Error fetching classes");
            }
            notifier.notify(Notice::error(LOAD_FAILED_MESSAGE));
        })
    }

    /// Hands the class over to the attendance view as a route parameter.
    pub fn select_class(&mut self, id: &str, navigator: &dyn Navigator) {
        self.selected = Some(id.to_string());
        navigator.navigate(Route::Attendance {
            class_id: id.to_string(),
        });
    }

    pub async fn delete_class(
        &mut self,
        id: &str,
        name: &str,
        repo: &dyn ClassRepository,
        notifier: &dyn Notifier,
    ) -> DeleteOutcome {
        if !notifier.confirm(&delete_prompt(name)).await {
            return DeleteOutcome::Cancelled;
        }

        match repo.delete_class(id).await {
            Ok(()) => {
                self.classes.retain(|class| class.id != id);
                if self.selected.as_deref() == Some(id) {
                    self.selected = None;
                }
                info!(%id, class = %name, "Class deleted successfully");
                notifier.notify(Notice::success(
                    "Deleted!",
                    format!("\"{name}\" class has been deleted successfully."),
                ));
                DeleteOutcome::Deleted
            }
            Err(err) => {
                warn!(%id, error = %err, "Error deleting class");
                notifier.notify(Notice::error(DELETE_FAILED_MESSAGE));
                DeleteOutcome::Failed(err)
            }
        }
    }

    pub async fn handle(
        &mut self,
        action: BrowserAction,
        repo: &dyn ClassRepository,
        notifier: &dyn Notifier,
        navigator: &dyn Navigator,
    ) -> ActionOutcome {
        match action {
            BrowserAction::Open { id } => {
                self.select_class(&id, navigator);
                ActionOutcome::Opened
            }
            BrowserAction::Delete { id, name } => {
                ActionOutcome::Delete(self.delete_class(&id, &name, repo, notifier).await)
            }
        }
    }
}
