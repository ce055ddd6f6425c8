use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Mutex;
use tracing::info;

use super::{ClassRepository, RepositoryError};
use crate::models::{ClassRecord, NewClass, StudentEntry};

const AUTO_ID_LEN: usize = 20;
const AUTO_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Firestore-style auto id.
fn auto_id() -> String {
    let mut rng = rand::rng();
    (0..AUTO_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..AUTO_ID_CHARSET.len());
            AUTO_ID_CHARSET[idx] as char
        })
        .collect()
}

#[derive(Default)]
struct State {
    classes: Vec<ClassRecord>,
    failure: Option<RepositoryError>,
}

/// Process-local class store.
///
/// Used for local runs without a Firestore project and as the test double
/// for the view-models: it can be told to fail every call and counts the
/// calls it received.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
    calls: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classes(classes: Vec<ClassRecord>) -> Self {
        Self {
            state: Mutex::new(State {
                classes,
                failure: None,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// Makes every following call fail with `failure`, or succeed again on `None`.
    pub async fn fail_with(&self, failure: Option<RepositoryError>) {
        self.state.lock().await.failure = failure;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<ClassRecord> {
        self.state.lock().await.classes.clone()
    }

    fn record_call(&self, state: &State) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClassRepository for MemoryRepository {
    async fn list_classes(&self) -> Result<Vec<ClassRecord>, RepositoryError> {
        let state = self.state.lock().await;
        self.record_call(&state)?;
        Ok(state.classes.clone())
    }

    async fn create_class(
        &self,
        name: String,
        students: Vec<StudentEntry>,
    ) -> Result<String, RepositoryError> {
        let mut state = self.state.lock().await;
        self.record_call(&state)?;

        let id = auto_id();
        let record = NewClass::new(name, students).into_record(id.clone());
        info!(%id, name = %record.name, students = record.total_students, "class stored in memory");
        state.classes.push(record);
        Ok(id)
    }

    /// Deleting an id that does not exist succeeds, as it does in Firestore.
    async fn delete_class(&self, id: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        self.record_call(&state)?;
        state.classes.retain(|class| class.id != id);
        Ok(())
    }
}
