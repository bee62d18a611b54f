use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use nrw_core::{
    compute_dashboard, ingest_snapshots, ingest_zones, parse_date, Dashboard, Intervention,
    InterventionSink, InterventionSource, KpiSummary, RankingResponse, Snapshot, SnapshotSink,
    SnapshotSource, Zone, ZoneDirectory,
};

/// Everything the service needs from its backing store
pub trait NrwStore:
    SnapshotSource + SnapshotSink + ZoneDirectory + InterventionSource + InterventionSink
{
}

impl<T> NrwStore for T where
    T: SnapshotSource + SnapshotSink + ZoneDirectory + InterventionSource + InterventionSink
{
}

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    dashboards_total: Counter<u64>,
    snapshots_ingested_total: Counter<u64>,
    store: Arc<dyn NrwStore>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Records already written when a batch write failed partway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted: Option<usize>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: msg.into(),
            persisted: None,
        }),
    )
}

fn internal(err: anyhow::Error) -> ApiError {
    tracing::error!(error = ?err, "store failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
            persisted: None,
        }),
    )
}

pub fn build_app(store: Arc<dyn NrwStore>) -> Result<(Router, Arc<AppState>)> {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .context("failed to build prometheus exporter")?;
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("nrw-service");

    let requests_total = meter
        .u64_counter("nrw_requests_total")
        .with_description("Total HTTP requests served")
        .init();
    let dashboards_total = meter
        .u64_counter("nrw_dashboard_computations_total")
        .with_description("Dashboard computation passes")
        .init();
    let snapshots_ingested_total = meter
        .u64_counter("nrw_snapshots_ingested_total")
        .with_description("Snapshots accepted and appended")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        dashboards_total,
        snapshots_ingested_total,
        store,
    });

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/zones", get(list_zones).put(replace_zones))
        .route("/api/v1/snapshots", get(list_snapshots).post(post_snapshots))
        .route(
            "/api/v1/interventions",
            get(list_interventions).post(post_intervention),
        )
        .route("/api/v1/nrw/dashboard", get(dashboard))
        .route("/api/v1/nrw/ranking", get(ranking))
        .route("/api/v1/nrw/kpis", get(kpis))
        .with_state(Arc::clone(&state));

    Ok((router, state))
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state.requests_total.add(1, &[]);
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> (
    [(axum::http::header::HeaderName, axum::http::HeaderValue); 1],
    String,
) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

async fn list_zones(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Zone>>, ApiError> {
    state.requests_total.add(1, &[]);
    let zones = state.store.zones().await.map_err(internal)?;
    Ok(Json(zones))
}

async fn replace_zones(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.requests_total.add(1, &[]);
    let report = ingest_zones(&payload).map_err(|e| bad_request(e.to_string()))?;
    state
        .store
        .replace_zones(&report.accepted)
        .await
        .map_err(internal)?;

    tracing::info!(
        zones = report.accepted.len(),
        rejected = report.rejected,
        "zone directory replaced"
    );
    Ok(Json(serde_json::json!({
        "accepted": report.accepted.len(),
        "rejected": report.rejected,
    })))
}

#[derive(Deserialize)]
struct SnapshotQuery {
    zone_id: Option<String>,
}

async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SnapshotQuery>,
) -> Result<Json<Vec<Snapshot>>, ApiError> {
    state.requests_total.add(1, &[]);
    let mut snapshots = state.store.snapshots().await.map_err(internal)?;
    if let Some(zone_id) = q.zone_id.as_deref() {
        snapshots.retain(|s| s.zone_id == zone_id);
    }
    snapshots.sort_by(|a, b| b.as_of.cmp(&a.as_of));
    Ok(Json(snapshots))
}

/// Accepts one snapshot object or an array of them
///
/// Records are appended in order. If the store fails partway, the records
/// already written stay written and the error reports how many there were.
async fn post_snapshots(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    state.requests_total.add(1, &[]);
    let payload = if payload.is_object() {
        Value::Array(vec![payload])
    } else {
        payload
    };
    let report = ingest_snapshots(&payload).map_err(|e| bad_request(e.to_string()))?;
    if report.accepted.is_empty() && report.rejected > 0 {
        return Err(bad_request("no valid snapshots in payload"));
    }

    let total = report.accepted.len();
    let mut persisted = 0;
    for snapshot in &report.accepted {
        if let Err(err) = state.store.append(snapshot).await {
            state.snapshots_ingested_total.add(persisted as u64, &[]);
            tracing::error!(error = ?err, persisted, total, "snapshot batch interrupted");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("stored {persisted} of {total} snapshots: {err}"),
                    persisted: Some(persisted),
                }),
            ));
        }
        persisted += 1;
    }
    state.snapshots_ingested_total.add(persisted as u64, &[]);

    tracing::info!(
        accepted = report.accepted.len(),
        rejected = report.rejected,
        "snapshots ingested"
    );
    Ok(Json(serde_json::json!({
        "accepted": report.accepted.len(),
        "rejected": report.rejected,
    })))
}

async fn list_interventions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Intervention>>, ApiError> {
    state.requests_total.add(1, &[]);
    let interventions = state.store.interventions().await.map_err(internal)?;
    Ok(Json(interventions))
}

async fn post_intervention(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Intervention>), ApiError> {
    state.requests_total.add(1, &[]);
    let intervention: Intervention = serde_json::from_value(payload)
        .map_err(|e| bad_request(format!("invalid intervention: {e}")))?;
    state.store.record(&intervention).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(intervention)))
}

#[derive(Deserialize)]
struct AsOfQuery {
    as_of: Option<String>,
}

impl AsOfQuery {
    /// Reference date for the pass; the clock is only read when none was given
    fn resolve(&self) -> Result<NaiveDate, ApiError> {
        match self.as_of.as_deref() {
            None | Some("") => Ok(chrono::Utc::now().date_naive()),
            Some(s) => parse_date(&Value::String(s.to_string()))
                .ok_or_else(|| bad_request(format!("invalid as_of: {s}"))),
        }
    }
}

async fn load_dashboard(state: &AppState, q: &AsOfQuery) -> Result<Dashboard, ApiError> {
    let as_of = q.resolve()?;
    let (snapshots, zones) =
        tokio::try_join!(state.store.snapshots(), state.store.zones()).map_err(internal)?;

    let dashboard = compute_dashboard(&snapshots, &zones, as_of);
    state.dashboards_total.add(1, &[]);
    Ok(dashboard)
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AsOfQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    state.requests_total.add(1, &[]);
    Ok(Json(load_dashboard(&state, &q).await?))
}

async fn ranking(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AsOfQuery>,
) -> Result<Json<RankingResponse>, ApiError> {
    state.requests_total.add(1, &[]);
    Ok(Json(load_dashboard(&state, &q).await?.ranking))
}

async fn kpis(
    State(state): State<Arc<AppState>>,
    Query(q): Query<AsOfQuery>,
) -> Result<Json<KpiSummary>, ApiError> {
    state.requests_total.add(1, &[]);
    Ok(Json(load_dashboard(&state, &q).await?.kpis))
}
