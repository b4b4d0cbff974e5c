mod catalog;
mod contact;
mod items;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use toybazaar_db::ToyStore;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};
use crate::resolver::ResolveError;

#[derive(Clone)]
pub struct AppState {
    pub store: ToyStore,
    /// Enables the contact-link endpoint.
    pub contact_phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Map a resolver failure to its HTTP response. Configuration and store
/// details are logged and replaced by a generic message.
pub(super) fn map_resolve_error(request_id: &str, error: ResolveError) -> ApiError {
    match error {
        ResolveError::InvalidInput(message) => ApiError::new(StatusCode::BAD_REQUEST, message),
        ResolveError::NotFound => ApiError::new(StatusCode::NOT_FOUND, "Not found"),
        ResolveError::Configuration(reason) => {
            tracing::error!(request_id, error = %reason, "configuration error");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
        ResolveError::StoreUnavailable(e) => {
            tracing::error!(request_id, error = %e, "document store query failed");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/collection-query", get(catalog::list_collection))
        .route(
            "/item/{identifier}",
            get(items::get_item)
                .patch(items::update_item)
                .post(items::like_item),
        )
        .route("/item/{identifier}/contact", get(contact::contact_link))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                store: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(request_id = %req_id.0, error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    store: "unavailable",
                }),
            )
        }
    }
}
