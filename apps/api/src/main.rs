//! GridRights API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::{get, post, put};
use gridrights_application::{
    AccessControlService, EditorRegistry, PermissionProbe, RightsGateway, SubjectDirectory,
    SubjectDirectoryService,
};
use gridrights_core::AppError;
use gridrights_infrastructure::{
    HttpRightsGateway, HttpSubjectDirectory, InMemoryRightsGateway, InMemorySubjectDirectory,
    StaticPermissionProbe,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api_config::{ApiConfig, UpstreamProviderConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let (gateway, directory): (Arc<dyn RightsGateway>, Arc<dyn SubjectDirectory>) =
        match &config.upstream {
            UpstreamProviderConfig::Memory => {
                info!("serving the seeded in-memory upstream (development mode)");
                (
                    Arc::new(InMemoryRightsGateway::with_demo_catalog()),
                    Arc::new(InMemorySubjectDirectory::with_demo_roster()),
                )
            }
            UpstreamProviderConfig::Http {
                base_url,
                timeout_seconds,
            } => {
                let http_client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(*timeout_seconds))
                    .build()
                    .map_err(|error| {
                        AppError::Internal(format!("failed to build HTTP client: {error}"))
                    })?;
                (
                    Arc::new(HttpRightsGateway::new(http_client.clone(), base_url.clone())),
                    Arc::new(HttpSubjectDirectory::new(http_client, base_url.clone())),
                )
            }
        };

    let probe: Arc<dyn PermissionProbe> = match &config.operator_grants {
        None => Arc::new(StaticPermissionProbe::allow_all()),
        Some(grants) => Arc::new(StaticPermissionProbe::with_grants(grants.iter().copied())),
    };
    let access_control = AccessControlService::new(probe);

    let app_state = AppState {
        editor_registry: Arc::new(EditorRegistry::new(gateway, access_control)),
        subject_directory_service: SubjectDirectoryService::new(directory),
    };

    let protected_routes = Router::new()
        .route(
            "/api/subjects/users",
            get(handlers::subjects::search_users_handler),
        )
        .route(
            "/api/subjects/groups",
            get(handlers::subjects::search_user_groups_handler),
        )
        .route("/api/editors", post(handlers::editors::open_editor_handler))
        .route(
            "/api/editors/{session_id}",
            get(handlers::editors::get_editor_handler)
                .delete(handlers::editors::close_editor_handler),
        )
        .route(
            "/api/editors/{session_id}/subject",
            put(handlers::editors::select_subject_handler),
        )
        .route(
            "/api/editors/{session_id}/toggles",
            post(handlers::editors::toggle_handler),
        )
        .route(
            "/api/editors/{session_id}/save",
            post(handlers::editors::save_handler),
        )
        .route(
            "/api/editors/{session_id}/reload",
            post(handlers::editors::reload_handler),
        )
        .route_layer(from_fn(middleware::require_operator));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(middleware::OPERATOR_SUBJECT_HEADER),
            HeaderName::from_static(middleware::OPERATOR_NAME_HEADER),
        ]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&config.api_host).map_err(|error| {
        AppError::Internal(format!("invalid API_HOST '{}': {error}", config.api_host))
    })?;
    let address = SocketAddr::from((host, config.api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "gridrights-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
