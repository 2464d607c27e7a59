//! HTTP shell over the report pipeline: one upload endpoint, windowed
//! read endpoints for KPIs and chart series, and the window-independent
//! performance table. Chart drawing stays on the client; this side only
//! hands over computed series.

pub mod report_routes;


use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use fund_core::{FundRecord, LoadError};
use serde::Serialize;
use timeseries_store::SeriesStore;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared handler state. The single write lock serializes load swaps, so a
/// second upload can never interleave a partial record set with the first.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<SeriesStore>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(SeriesStore::new())),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error mapped onto HTTP statuses: rejected inputs are 422,
/// reads against an unloaded store are 404, the rest is 500.
#[derive(Debug)]
pub enum AppError {
    Unprocessable(String),
    NotFound(&'static str),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            AppError::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::Unprocessable(err.to_string())
    }
}

/// Decode and validate in one step. Pure: the store is only touched after
/// this returns `Ok`, so a failed load leaves prior state untouched.
pub fn load_records(file_name: &str, bytes: &[u8]) -> Result<Vec<FundRecord>, LoadError> {
    let sheet = sheet_decoder::decode(file_name, bytes)?;
    let records = record_builder::build_records(&sheet)?;
    Ok(records)
}

pub fn app(state: AppState) -> Router {
    report_routes::report_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Attempt the startup auto-load from the configured report path. Failure
/// is expected when no report file ships alongside the binary; the user
/// uploads manually instead.
pub async fn try_auto_load(state: &AppState) {
    let path = std::env::var("DASHBOARD_REPORT_PATH")
        .unwrap_or_else(|_| "data/fund_report.xlsx".to_string());

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::info!(path = %path, error = %err, "no report at auto-load path, waiting for upload");
            return;
        }
    };

    match load_records(&path, &bytes) {
        Ok(records) => {
            tracing::info!(path = %path, records = records.len(), "report auto-loaded");
            state.store.write().await.load(records);
        }
        Err(err) => {
            tracing::info!(path = %path, error = %err, "auto-load failed, waiting for upload");
        }
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard_server=info,tower_http=warn".into()),
        )
        .init();

    let state = AppState::new();
    try_auto_load(&state).await;

    let bind = std::env::var("DASHBOARD_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("dashboard server listening on {bind}");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
