use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::settings::Settings;

static SHARED: OnceCell<Arc<DataClient>> = OnceCell::new();

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Firestore base URL cannot carry a path: {0}")]
    CannotBeABase(Url),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Handle to the remote document database.
///
/// Read-only once built. Holds the pooled HTTP client and the resolved
/// `.../documents` root all repository calls are made against.
#[derive(Debug)]
pub struct DataClient {
    http: reqwest::Client,
    documents_url: Url,
    api_key: Option<String>,
    project_id: String,
}

impl DataClient {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let mut documents_url = settings.firestore_base_url.clone();
        documents_url
            .path_segments_mut()
            .map_err(|_| ClientError::CannotBeABase(settings.firestore_base_url.clone()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                settings.firestore_project_id.as_str(),
                "databases",
                settings.firestore_database.as_str(),
                "documents",
            ]);

        let http = reqwest::Client::builder()
            .user_agent(concat!("classroom-attendance/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            documents_url,
            api_key: settings.firestore_api_key.clone(),
            project_id: settings.firestore_project_id.clone(),
        })
    }

    /// Process-wide handle. The first call builds it; later calls return the
    /// same instance and ignore their settings.
    pub fn shared(settings: &Settings) -> Result<Arc<DataClient>, ClientError> {
        SHARED
            .get_or_try_init(|| {
                let client = DataClient::new(settings)?;
                info!(project = %client.project_id, "Firestore client initialized");
                Ok(Arc::new(client))
            })
            .cloned()
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// URL of a collection or of one document inside it.
    pub fn document_url(&self, segments: &[&str]) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Backend;

    fn settings(base: &str, api_key: Option<&str>) -> Settings {
        Settings {
            debug: false,
            enable_swagger: false,
            port: 8080,
            backend: Backend::Firestore,
            firestore_base_url: Url::parse(base).unwrap(),
            firestore_project_id: "attendance".to_string(),
            firestore_database: "(default)".to_string(),
            firestore_api_key: api_key.map(str::to_string),
            collection: "classes".to_string(),
            cors_allow_any_origin: true,
        }
    }

    #[test]
    fn test_document_url_without_key() {
        let client = DataClient::new(&settings("https://firestore.googleapis.com", None)).unwrap();
        let url = client.document_url(&["classes", "abc"]);
        assert_eq!(
            url.as_str(),
            concat!(
                "https://firestore.googleapis.com/v1/projects/attendance",
                "/databases/(default)/documents/classes/abc"
            )
        );
    }

    #[test]
    fn test_document_url_with_key_and_trailing_slash() {
        let client =
            DataClient::new(&settings("http://localhost:8081/", Some("web-key"))).unwrap();
        let url = client.document_url(&["classes"]);
        assert_eq!(url.path(), "/v1/projects/attendance/databases/(default)/documents/classes");
        assert_eq!(url.query(), Some("key=web-key"));
    }

    #[test]
    fn test_shared_returns_same_handle() {
        let first = DataClient::shared(&settings("http://localhost:1", None)).unwrap();
        let second = DataClient::shared(&settings("http://localhost:2", None)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
