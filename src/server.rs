use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::report::{HealthStatus, Report};
use crate::types::{PredictionResult, TelemetrySample};

#[derive(Serialize, Debug)]
pub struct Out {
    pub t: i64,
    pub prediction: PredictionResult,
    pub health: HealthStatus,
    pub report: String,
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .with_state(AppState { pipeline })
}

fn status_for(e: &PipelineError) -> StatusCode {
    match e {
        PipelineError::InvalidTelemetry(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn predict(
    State(state): State<AppState>,
    Json(sample): Json<TelemetrySample>,
) -> Result<Json<Out>, (StatusCode, Json<serde_json::Value>)> {
    let prediction = state.pipeline.predict(&sample).map_err(|e| {
        (
            status_for(&e),
            Json(json!({ "error": e.to_string(), "kind": e.kind() })),
        )
    })?;

    let report = Report::new(&sample, &prediction);
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default();
    Ok(Json(Out {
        t: now_ms,
        health: report.health(),
        report: report.to_string(),
        prediction,
    }))
}
