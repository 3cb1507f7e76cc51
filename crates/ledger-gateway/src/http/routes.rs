//! Routes and error mapping.
//!
//! | Route | Operation | Success |
//! |-------|-----------|---------|
//! | `POST /api/v1/users` | create-user | 201 `{message, userId}` |
//! | `POST /api/v1/access/check` | check-access | 200 `{userId, resourceId, accessGranted, timestamp}` |
//! | `POST /api/v1/audit/events` | record-event | 201 `{message, timestamp}` |
//! | `GET /health` | - | 200 `{status, version}` |
//!
//! Failures are `{error}` with 400 for caller faults and 500 otherwise.
//! Every response carries the security headers from [`super::headers`], and
//! each request is logged at INFO when its response is sent.

use crate::domain::error::{translate, GatewayError, StatusKind};
use crate::domain::types::{
    CheckAccessRequest, CreateUserRequest, CreateUserResponse, RecordEventRequest,
    RecordEventResponse,
};
use crate::http::cors::create_cors_layer;
use crate::http::headers::with_security_headers;
use crate::service::GatewayService;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize)]
struct UserCreatedBody {
    message: &'static str,
    #[serde(flatten)]
    user: CreateUserResponse,
}

#[derive(Serialize)]
struct EventRecordedBody {
    message: &'static str,
    #[serde(flatten)]
    event: RecordEventResponse,
}

/// Transport status for a translated error kind.
pub fn status_code(kind: StatusKind) -> StatusCode {
    match kind {
        StatusKind::CallerFault => StatusCode::BAD_REQUEST,
        StatusKind::ServiceFault | StatusKind::InternalFault => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Wrapper turning a gateway error into an HTTP response.
struct ApiFailure(GatewayError);

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (kind, message) = translate(&self.0);
        (status_code(kind), Json(ErrorBody { error: message })).into_response()
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        ApiFailure(GatewayError::validation(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// Build the HTTP router for a service.
pub fn router(service: Arc<GatewayService>) -> Router {
    let cors = create_cors_layer(&service.config().cors);

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let routes = Router::new()
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/access/check", post(check_access))
        .route("/api/v1/audit/events", post(record_event))
        .route("/health", get(health));

    with_security_headers(routes)
        .layer(trace)
        .layer(cors)
        .with_state(service)
}

async fn create_user(
    State(service): State<Arc<GatewayService>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Response, ApiFailure> {
    let Json(request) = payload?;
    let user = service.create_user(&request).await.map_err(ApiFailure)?;
    Ok((
        StatusCode::CREATED,
        Json(UserCreatedBody {
            message: "user created",
            user,
        }),
    )
        .into_response())
}

async fn check_access(
    State(service): State<Arc<GatewayService>>,
    payload: Result<Json<CheckAccessRequest>, JsonRejection>,
) -> Result<Response, ApiFailure> {
    let Json(request) = payload?;
    let decision = service.check_access(&request).await.map_err(ApiFailure)?;
    Ok((StatusCode::OK, Json(decision)).into_response())
}

async fn record_event(
    State(service): State<Arc<GatewayService>>,
    payload: Result<Json<RecordEventRequest>, JsonRejection>,
) -> Result<Response, ApiFailure> {
    let Json(request) = payload?;
    let event = service.record_event(&request).await.map_err(ApiFailure)?;
    Ok((
        StatusCode::CREATED,
        Json(EventRecordedBody {
            message: "event recorded",
            event,
        }),
    )
        .into_response())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}
