use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    AgriProfitError, VERSION,
    error::ErrorKind,
    estimation::EstimationPipeline,
    models::Recommendation,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EstimationPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<EstimationPipeline>) -> Self {
        Self { pipeline }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub pincode: String,
    pub land_area: f64,
}

/// Recommendation plus its simplified ratio string
#[derive(Debug, Serialize, Deserialize)]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    /// e.g. "85:78" or "maize (single recommendation)"
    pub ratio_display: String,
}

impl From<Recommendation> for EstimateResponse {
    fn from(recommendation: Recommendation) -> Self {
        Self {
            ratio_display: recommendation.ratio_display(),
            recommendation,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Library error rendered as a JSON response
pub struct ApiError(AgriProfitError);

impl From<AgriProfitError> for ApiError {
    fn from(err: AgriProfitError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AgriProfitError::invalid_input(rejection.body_text()))
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::NoSuitableCrop => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::WeatherFetch => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = ErrorBody {
            error: kind.as_str().to_string(),
            message: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/pincodes", get(list_pincodes))
        .route("/estimate", post(estimate))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
    })
}

async fn list_pincodes(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.pipeline.store().pincodes())
}

async fn estimate(
    State(state): State<AppState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let Json(request) = payload?;
    let recommendation = state
        .pipeline
        .estimate(&request.pincode, request.land_area)
        .await?;
    Ok(Json(recommendation.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorKind::NoSuitableCrop),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(ErrorKind::WeatherFetch), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(AgriProfitError::model("bad artifact").kind()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
