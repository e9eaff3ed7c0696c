use crate::core::districts::DistrictCatalog;
use crate::core::predict::PredictionService;
use crate::domain::model::{DistrictRecord, PredictionOutcome};
use crate::domain::ports::{WeatherProvider, YieldPredictor};
use crate::utils::error::CropApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const HOME_MESSAGE: &str = "Crop Yield Prediction API is running";

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    districts: Arc<DistrictCatalog>,
    predictions: PredictionService,
}

impl AppState {
    pub fn new(
        districts: DistrictCatalog,
        weather: Arc<dyn WeatherProvider>,
        predictor: Arc<dyn YieldPredictor>,
    ) -> Self {
        Self {
            districts: Arc::new(districts),
            predictions: PredictionService::new(weather, predictor),
        }
    }

    pub fn districts(&self) -> &DistrictCatalog {
        &self.districts
    }
}

// ---------- Handlers ----------

async fn home() -> Json<Value> {
    Json(json!({ "message": HOME_MESSAGE }))
}

async fn list_districts(State(state): State<AppState>) -> Json<Vec<DistrictRecord>> {
    Json(state.districts.records().to_vec())
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionOutcome>, CropApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!("Rejected predict body: {}", rejection);
        CropApiError::InvalidBody
    })?;

    let outcome = state.predictions.predict(&body).await?;
    Ok(Json(outcome))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/districts", get(list_districts))
        .route("/predict", post(predict))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 在已綁定的 listener 上提供服務，直到收到 Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Crop Yield Prediction API listening on http://{}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, stopping server");
}
