//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{error, info, warn};

use crate::domain::{ServiceDate, ServiceTime, StopId};
use crate::feed::FeedError;
use crate::planner::{PlanError, PlanRequest, Planner};

use super::dto::*;
use super::state::AppState;

/// Default number of stop suggestions.
const DEFAULT_STOP_LIMIT: usize = 10;

/// Upper bound on stop suggestions per request.
const MAX_STOP_LIMIT: usize = 50;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops/search", get(search_stops))
        .route("/api/stops/:id", get(get_stop))
        .route("/api/plan", post(plan_trip))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stops by name.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchRequest>,
) -> Result<Json<StopSearchResponse>, AppError> {
    let store = state.feed.current().await?;
    let limit = req.limit.unwrap_or(DEFAULT_STOP_LIMIT).min(MAX_STOP_LIMIT);

    let stops = store
        .search_stops(&req.q, limit)
        .into_iter()
        .map(StopResult::from_stop)
        .collect();

    Ok(Json(StopSearchResponse { stops }))
}

/// Look up one stop by id.
async fn get_stop(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StopResult>, AppError> {
    let store = state.feed.current().await?;

    store
        .stop(&id)
        .map(|stop| Json(StopResult::from_stop(stop)))
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown stop: {id}"),
        })
}

/// Plan direct and one-change trips between two stops.
async fn plan_trip(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PlanTripResponse>, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: PlanTripRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(&body), "invalid plan request JSON");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let date = ServiceDate::parse(&req.date).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let time = ServiceTime::parse_clock(&req.time).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let store = state.feed.current().await?;

    let request = PlanRequest::new(
        StopId::new(req.from),
        StopId::new(req.to),
        date,
        time,
        req.mode.into(),
    );

    let planner = Planner::new(&store, &state.config);
    let outcome = planner.plan(&request)?;

    Ok(Json(PlanTripResponse::from_outcome(&outcome, &store)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<FeedError> for AppError {
    fn from(e: FeedError) -> Self {
        match e {
            FeedError::NotLoaded => AppError::Unavailable {
                message: "Timetable data is not loaded yet".to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::UnknownStop(_) => AppError::NotFound {
                message: e.to_string(),
            },
            PlanError::InvalidRequest(_) => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Unavailable { message } => {
                (StatusCode::SERVICE_UNAVAILABLE, message.clone())
            }
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            info!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
