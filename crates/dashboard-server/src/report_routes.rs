use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use fund_core::{FormattedKpis, FundamentalsSeries, KpiSummary, PerformanceSeries, PerformanceTable};
use metrics_engine::{fundamentals_series, format_kpis, kpi_summary, performance_series, performance_table};
use serde::{Deserialize, Serialize};
use timeseries_store::Window;

use crate::{load_records, ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct UploadQuery {
    /// Original file name; the extension picks the decode backend.
    pub name: String,
}

#[derive(Deserialize)]
pub struct WindowQuery {
    /// `"all"` or an integer month count. Missing means all.
    pub window: Option<String>,
}

#[derive(Serialize)]
pub struct LoadSummary {
    pub file_name: String,
    pub records: usize,
}

#[derive(Serialize)]
pub struct KpiReport {
    pub summary: KpiSummary,
    pub formatted: FormattedKpis,
}

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/report", post(upload_report))
        .route("/api/report/kpis", get(get_kpis))
        .route("/api/report/table", get(get_table))
        .route("/api/report/series/performance", get(get_performance_series))
        .route("/api/report/series/fundamentals", get(get_fundamentals_series))
}

async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}

/// Ingest a report. Decode and validation run on the request's own data;
/// the store is swapped in a single write-lock acquisition only after both
/// succeed, so concurrent uploads serialize and never mix rows.
async fn upload_report(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<LoadSummary>>, AppError> {
    let records = load_records(&query.name, &body)?;
    let count = records.len();

    state.store.write().await.load(records);
    tracing::info!(file = %query.name, records = count, "report loaded");

    Ok(Json(ApiResponse::success(LoadSummary {
        file_name: query.name,
        records: count,
    })))
}

/// KPI cards for the requested window.
async fn get_kpis(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<KpiReport>>, AppError> {
    let window = parse_window(&query)?;

    let mut store = state.store.write().await;
    if store.is_empty() {
        return Err(AppError::NotFound("no report loaded"));
    }
    let view = store.filter_by_window(window);
    let summary = kpi_summary(view).ok_or(AppError::NotFound("window matches no records"))?;
    let formatted = format_kpis(&summary);

    Ok(Json(ApiResponse::success(KpiReport { summary, formatted })))
}

/// The performance table. Deliberately window-independent: always the
/// full set.
async fn get_table(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PerformanceTable>>, AppError> {
    let store = state.store.read().await;
    let table =
        performance_table(store.full_set()).ok_or(AppError::NotFound("no report loaded"))?;
    Ok(Json(ApiResponse::success(table)))
}

async fn get_performance_series(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<PerformanceSeries>>, AppError> {
    let window = parse_window(&query)?;

    let mut store = state.store.write().await;
    if store.is_empty() {
        return Err(AppError::NotFound("no report loaded"));
    }
    let series = performance_series(store.filter_by_window(window));
    Ok(Json(ApiResponse::success(series)))
}

async fn get_fundamentals_series(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<FundamentalsSeries>>, AppError> {
    let window = parse_window(&query)?;

    let mut store = state.store.write().await;
    if store.is_empty() {
        return Err(AppError::NotFound("no report loaded"));
    }
    let series = fundamentals_series(store.filter_by_window(window));
    Ok(Json(ApiResponse::success(series)))
}

fn parse_window(query: &WindowQuery) -> Result<Window, AppError> {
    match &query.window {
        None => Ok(Window::All),
        Some(value) => Window::parse(value)
            .ok_or_else(|| AppError::Unprocessable(format!("invalid window value: {value}"))),
    }
}
