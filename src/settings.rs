use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

/// Which class repository the service talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Firestore,
    Memory,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub enable_swagger: bool,
    pub port: u16,
    pub backend: Backend,
    pub firestore_base_url: Url,
    pub firestore_project_id: String,
    pub firestore_database: String,
    pub firestore_api_key: Option<String>,
    pub collection: String,
    pub cors_allow_any_origin: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("debug", false)?
            .set_default("enable_swagger", true)?
            .set_default("port", 8080)?
            .set_default("backend", "firestore")?
            .set_default("firestore_base_url", "https://firestore.googleapis.com")?
            .set_default("firestore_project_id", "attendance-marking")?
            .set_default("firestore_database", "(default)")?
            .set_default("collection", "classes")?
            .set_default("cors_allow_any_origin", true)?
            // Optional attendance.toml next to the binary
            .add_source(File::with_name("attendance").required(false))
            // Environment variables with APP_ prefix, `__` for nesting
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}
