//! Application setup and server configuration.

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::*;

/// Image uploads go through the API; allow typical photo sizes
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub deps: ServerDeps,
    /// Platform host reported by `GET /`
    pub foundry_host: String,
}

impl AppState {
    pub fn new(deps: ServerDeps, foundry_host: impl Into<String>) -> Self {
        Self {
            db_pool: deps.db_pool.clone(),
            deps,
            foundry_host: foundry_host.into(),
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Build the Axum application router
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        // Pipeline
        .route("/push_file", post(push_file_handler))
        .route("/get_dataset", post(get_dataset_handler))
        .route("/api/pipeline/text", post(submit_text_handler))
        .route("/api/pipeline/image", post(submit_image_handler))
        .route("/api/pipeline/media-rows", post(media_rows_handler))
        .route("/api/chat/analyze-essay", post(analyze_essay_handler))
        .route("/api/chat/quick-help", post(quick_help_handler))
        // Directory
        .route("/api/schools", get(list_schools_handler))
        .route("/api/schools/:id", get(get_school_handler))
        .route("/api/schools/:id/organizations", get(list_organizations_handler))
        .route(
            "/api/schools/:id/organizations/search",
            get(search_organizations_handler),
        )
        .route(
            "/api/schools/:id/organizations/popular",
            get(popular_organizations_handler),
        )
        .route(
            "/api/organizations/:id",
            get(get_organization_handler).patch(update_organization_handler),
        )
        .route(
            "/api/users/:user_id/profile",
            get(get_profile_handler)
                .post(create_profile_handler)
                .patch(update_profile_handler),
        )
        .route(
            "/api/users/:user_id/applications",
            get(list_applications_handler).post(create_application_handler),
        )
        .route("/api/applications/:id", patch(update_application_handler))
        .route(
            "/api/users/:user_id/scrape-requests",
            get(list_user_scrape_requests_handler),
        )
        .route("/api/scrape-requests", post(create_scrape_request_handler))
        .route(
            "/api/scrape-requests/pending",
            get(list_pending_scrape_requests_handler),
        )
        .route(
            "/api/scrape-requests/:id/process",
            post(process_scrape_request_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
