use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use super::{ClassRepository, RepositoryError};
use crate::client::DataClient;
use crate::document::{Document, ListDocumentsResponse, decode_class, encode_class};
use crate::models::{ClassRecord, NewClass, StudentEntry};

/// Class repository backed by the Firestore REST API.
#[derive(Clone)]
pub struct FirestoreRepository {
    client: Arc<DataClient>,
    collection: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Maps a non-success response onto the closed error set. The gRPC status
/// name in the body wins; the HTTP status is the fallback.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> RepositoryError {
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.status, envelope.error.message),
        Err(_) => (String::new(), body.trim().to_string()),
    };
    let message = if message.is_empty() {
        status.to_string()
    } else {
        message
    };

    match code.as_str() {
        "PERMISSION_DENIED" | "UNAUTHENTICATED" => RepositoryError::PermissionDenied(message),
        "UNAVAILABLE" | "DEADLINE_EXCEEDED" => RepositoryError::Unavailable(message),
        _ => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RepositoryError::PermissionDenied(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                RepositoryError::Unavailable(message)
            }
            _ => RepositoryError::Unknown(message),
        },
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RepositoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let body = response.text().await.unwrap_or_default();
    let err = classify_failure(status, &body);
    error!(%status, error = %err, "Firestore request failed");
    Err(err)
}

impl FirestoreRepository {
    pub fn new(client: Arc<DataClient>, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl ClassRepository for FirestoreRepository {
    async fn list_classes(&self) -> Result<Vec<ClassRecord>, RepositoryError> {
        let mut classes = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.client.document_url(&[self.collection.as_str()]);
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }
            debug!(collection = %self.collection, page = ?page_token, "listing documents");

            let response = self.client.http().get(url).send().await?;
            let page: ListDocumentsResponse = read_json(response).await?;
            for document in &page.documents {
                classes.push(decode_class(document)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!(count = classes.len(), collection = %self.collection, "loaded classes");
        Ok(classes)
    }

    async fn create_class(
        &self,
        name: String,
        students: Vec<StudentEntry>,
    ) -> Result<String, RepositoryError> {
        let class = NewClass::new(name, students);
        let url = self.client.document_url(&[self.collection.as_str()]);

        let response = self
            .client
            .http()
            .post(url)
            .json(&encode_class(&class))
            .send()
            .await?;
        let created: Document = read_json(response).await?;

        let id = created.id().to_string();
        if id.is_empty() {
            return Err(RepositoryError::Unknown(
                "store returned a document without a name".into(),
            ));
        }
        info!(%id, name = %class.name, students = class.total_students, "class document created");
        Ok(id)
    }

    async fn delete_class(&self, id: &str) -> Result<(), RepositoryError> {
        let url = self.client.document_url(&[self.collection.as_str(), id]);
        let response = self.client.http().delete(url).send().await?;
        let _: serde_json::Value = read_json(response).await?;
        info!(%id, "class document deleted");
        Ok(())
    }
}
