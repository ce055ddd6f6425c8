pub mod browser;
pub mod client;
pub mod dialog;
pub mod document;
pub mod error;
pub mod handlers;
pub mod models;
pub mod navigation;
pub mod openapi;
pub mod repository;
pub mod roster;
pub mod settings;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::{
    create_class, delete_class, healthz_live, healthz_ready, list_classes, root, select_class,
};
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::client::DataClient;
use crate::openapi::ApiDoc;
use crate::repository::{ClassRepository, FirestoreRepository, MemoryRepository};
use crate::settings::{Backend, Settings};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub repository: Arc<dyn ClassRepository>,
}

pub fn build_repository(
    settings: &Settings,
) -> Result<Arc<dyn ClassRepository>, Box<dyn std::error::Error>> {
    let repository: Arc<dyn ClassRepository> = match settings.backend {
        Backend::Firestore => {
            let client = DataClient::shared(settings)?;
            Arc::new(FirestoreRepository::new(client, settings.collection.clone()))
        }
        Backend::Memory => Arc::new(MemoryRepository::new()),
    };
    Ok(repository)
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let state = AppState {
        repository: build_repository(&settings)?,
        settings,
    };
    info!(
        backend = ?state.settings.backend,
        collection = %state.settings.collection,
        "class repository ready"
    );

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!("Starting Classroom Attendance API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/classes", get(list_classes).post(create_class))
        .route("/classes/{id}", axum::routing::delete(delete_class))
        .route("/classes/{id}/select", post(select_class))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    if state.settings.cors_allow_any_origin {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.layer(trace_layer)
}
