use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::processor::{AlertOutcome, AlertProcessor, AlertRequest, ProcessError};

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<AlertProcessor>,
    pub store_backend: String,
    pub notifier_backend: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/alert", get(ingest_alert))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maps_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AlertResponse {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            duplicate: None,
            message: None,
            region_id: None,
            row: None,
            responsible_email: None,
            maps_link: None,
            error: Some(error.into()),
        }
    }
}

/// GET /alert?regionId=..&timestamp=..&lat=..&lng=..
pub async fn ingest_alert(
    State(state): State<AppState>,
    Query(request): Query<AlertRequest>,
) -> (StatusCode, Json<AlertResponse>) {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "alert",
        %request_id,
        region = request.region_id.as_deref().unwrap_or("-")
    );
    let region_id = request.region_id.clone();

    let result = state.processor.process(&request).instrument(span).await;
    let (status, response) = match result {
        Ok(AlertOutcome::Notified {
            row,
            email,
            maps_link,
        }) => (
            StatusCode::OK,
            AlertResponse {
                success: true,
                duplicate: None,
                message: Some("alert recorded and responsible notified".to_string()),
                region_id,
                row: Some(row),
                responsible_email: Some(email),
                maps_link: Some(maps_link),
                error: None,
            },
        ),
        Ok(AlertOutcome::Duplicate { row }) => (
            StatusCode::OK,
            AlertResponse {
                success: true,
                duplicate: Some(true),
                message: Some("duplicate, already processed".to_string()),
                region_id,
                row: Some(row),
                responsible_email: None,
                maps_link: None,
                error: None,
            },
        ),
        Ok(AlertOutcome::Unroutable { row }) => (
            StatusCode::NOT_FOUND,
            AlertResponse {
                success: false,
                duplicate: None,
                message: Some("no responsible found for region".to_string()),
                region_id,
                row: Some(row),
                responsible_email: None,
                maps_link: None,
                error: None,
            },
        ),
        Err(e) => {
            let status = match &e {
                ProcessError::MissingParam(_) | ProcessError::Timestamp(_) => {
                    StatusCode::BAD_REQUEST
                }
                ProcessError::Store(_) | ProcessError::Notify(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            if status.is_server_error() {
                error!(%request_id, "alert pipeline failed: {}", e);
            }
            (status, AlertResponse::failure(e.to_string()))
        }
    };
    (status, Json(response))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    store: String,
    notifier: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store: state.store_backend.clone(),
        notifier: state.notifier_backend.clone(),
    })
}
