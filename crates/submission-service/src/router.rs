//! HTTP routing for the submission service.
//!
//! The public router serves `POST /version/v1/diagnosis-keys` and nothing
//! else; any other method on that path gets 405 from the router itself.
//! Health and metrics live on a separate management router, since the
//! counters tell real submissions from fake ones.

use crate::domain::config::SubmissionConfig;
use crate::domain::error::{ServiceError, SubmissionError};
use crate::domain::headers::SubmissionHeaders;
use crate::middleware::{SubmissionMetrics, TracingLayer};
use crate::ports::inbound::{SubmissionApi, SubmissionOutcome};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Path of the diagnosis key submission endpoint
pub const SUBMISSION_PATH: &str = "/version/v1/diagnosis-keys";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub submission: Arc<dyn SubmissionApi>,
    pub metrics: Arc<SubmissionMetrics>,
    pub max_request_size: usize,
}

impl AppState {
    pub fn new(
        submission: Arc<dyn SubmissionApi>,
        metrics: Arc<SubmissionMetrics>,
        config: &SubmissionConfig,
    ) -> Self {
        Self {
            submission,
            metrics,
            max_request_size: config.payload.max_request_size,
        }
    }
}

/// Build the public router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(SUBMISSION_PATH, post(submit_diagnosis_keys))
        .layer(TracingLayer::new())
        .with_state(state)
}

/// Build the management router (`/health`, `/metrics`)
pub fn build_management_router(metrics: Arc<SubmissionMetrics>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_json))
        .with_state(metrics)
}

/// Bind a listener, reporting failures as `ServiceError::Bind`.
pub async fn bind_listener(addr: SocketAddr) -> Result<TcpListener, ServiceError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| ServiceError::Bind(format!("{}: {}", addr, e)))
}

impl SubmissionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubmissionError::Header(_)
            | SubmissionError::MalformedPayload(_)
            | SubmissionError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            SubmissionError::TanRejected => StatusCode::FORBIDDEN,
            SubmissionError::Verification(_) | SubmissionError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // internal details stay in the logs
        let message = if self.is_client_error() {
            self.to_string()
        } else {
            "internal server error".to_string()
        };
        let body = Json(serde_json::json!({
            "error": self.code(),
            "message": message,
        }));
        (status, body).into_response()
    }
}

/// Submission handler. Success is always an empty 200, fake or not.
async fn submit_diagnosis_keys(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    state.metrics.record_received();

    match accept(&state, &headers, body).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => {
            state.metrics.record_failure(&e);
            if e.is_client_error() {
                info!(code = e.code(), error = %e, "Submission rejected");
            } else {
                error!(code = e.code(), error = %e, "Submission failed");
            }
            e.into_response()
        }
    }
}

async fn accept(
    state: &AppState,
    headers: &HeaderMap,
    body: Body,
) -> Result<SubmissionOutcome, SubmissionError> {
    let resolved = SubmissionHeaders::from_header_map(headers)?;

    let body = axum::body::to_bytes(body, state.max_request_size)
        .await
        .map_err(|e| SubmissionError::MalformedPayload(format!("request body rejected: {}", e)))?;

    state.submission.submit(resolved, body).await
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "submission-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics_json(State(metrics): State<Arc<SubmissionMetrics>>) -> impl IntoResponse {
    Json(metrics.to_json())
}
