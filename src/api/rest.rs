// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Read-only dashboard endpoints under `/api/`. Each request observes the
// snapshot cache and triggers a refresh when it is stale. When no snapshot
// can be produced the endpoints answer 500 with `{ "error": ... }`.
//
// CORS is configured permissively; the dashboard may be served elsewhere.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::analysis::events::MarketEvent;
use crate::analysis::forecast::Forecast;
use crate::analysis::levels::Levels;
use crate::analysis::resample::WeeklyRow;
use crate::analysis::AnalysisSnapshot;
use crate::app_state::AppState;
use crate::market_data::{InstrumentPair, SeriesRow};
use crate::types::TrendLabel;

const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/data", get(data))
        .route("/api/analysis", get(analysis))
        .layer(cors)
        .with_state(state)
}

fn unavailable() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Failed to load data" })),
    )
        .into_response()
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    has_snapshot: bool,
    snapshot_age_secs: Option<u64>,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        has_snapshot: state.analysis.current().is_some(),
        snapshot_age_secs: state
            .analysis
            .last_refreshed()
            .map(|t| t.elapsed().as_secs()),
        uptime_secs: state.start_time.elapsed().as_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Price series (daily + weekly views)
// =============================================================================

async fn data(State(state): State<Arc<AppState>>) -> Response {
    let Some(snapshot) = state.snapshot().await else {
        warn!("GET /api/data: no snapshot available");
        return unavailable();
    };

    let pair = &snapshot.instruments;
    let daily: Vec<Value> = snapshot
        .daily
        .iter()
        .map(|row| Value::Object(daily_record(pair, row)))
        .collect();
    let weekly: Vec<Value> = snapshot
        .weekly
        .iter()
        .map(|row| Value::Object(weekly_record(pair, row)))
        .collect();

    Json(serde_json::json!({ "daily": daily, "weekly": weekly })).into_response()
}

fn ratio_key(pair: &InstrumentPair) -> String {
    format!("{}_{}_Ratio", pair.a, pair.b)
}

/// Daily row keyed by instrument labels (e.g. `XAU`, `XAU_MA50`). Undefined
/// values serialise as `null`.
fn daily_record(pair: &InstrumentPair, row: &SeriesRow) -> Map<String, Value> {
    let d = &row.derived;
    let mut m = Map::new();
    m.insert("Date".into(), row.point.date.format(DATE_FORMAT).to_string().into());
    m.insert(pair.a.clone(), number(Some(row.point.price_a)));
    m.insert(pair.b.clone(), number(Some(row.point.price_b)));
    let averages = [
        (&pair.a, [d.ma20_a, d.ma50_a, d.ma200_a]),
        (&pair.b, [d.ma20_b, d.ma50_b, d.ma200_b]),
    ];
    for (label, values) in averages {
        for (window, value) in [20, 50, 200].into_iter().zip(values) {
            m.insert(format!("{label}_MA{window}"), number(value));
        }
    }
    m.insert(format!("{}_Returns", pair.a), number(d.return_a));
    m.insert(ratio_key(pair), number(d.ratio));
    m.insert(
        "Signal".into(),
        serde_json::to_value(d.signal).unwrap_or(Value::Null),
    );
    m
}

fn weekly_record(pair: &InstrumentPair, row: &WeeklyRow) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("Date".into(), row.date.format(DATE_FORMAT).to_string().into());
    m.insert(pair.a.clone(), number(Some(row.price_a)));
    m.insert(pair.b.clone(), number(Some(row.price_b)));
    m.insert(ratio_key(pair), number(row.ratio));
    m
}

/// Finite numbers pass through; `None` and NaN/inf become `null`.
fn number(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

// =============================================================================
// Analysis summary
// =============================================================================

#[derive(Serialize)]
struct AnalysisResponse<'a> {
    trend: &'a TrendLabel,
    prediction: &'a Forecast,
    levels: &'a Levels,
    market_events: &'a [MarketEvent],
    momentum_text: &'a str,
}

impl<'a> From<&'a AnalysisSnapshot> for AnalysisResponse<'a> {
    fn from(s: &'a AnalysisSnapshot) -> Self {
        Self {
            trend: &s.trend,
            prediction: &s.prediction,
            levels: &s.levels,
            market_events: &s.market_events,
            momentum_text: &s.momentum_text,
        }
    }
}

async fn analysis(State(state): State<Arc<AppState>>) -> Response {
    match state.snapshot().await {
        Some(snapshot) => Json(AnalysisResponse::from(snapshot.as_ref())).into_response(),
        None => {
            warn!("GET /api/analysis: no snapshot available");
            unavailable()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::store::tests::{temp_config, StaticSource};
    use crate::market_data::SeriesStore;
    use crate::provider::DailyClose;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{Duration, NaiveDate};
    use tower::ServiceExt;

    fn closes(days: i64, base: f64, step: f64) -> Vec<DailyClose> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..days)
            .map(|d| DailyClose {
                date: start + Duration::days(d),
                close: Some(base + step * d as f64),
            })
            .collect()
    }

    fn app(source: StaticSource) -> (Router, std::path::PathBuf) {
        let config = temp_config();
        let store = SeriesStore::new(Arc::new(source), &config);
        let state = Arc::new(AppState::new(store, &config));
        (router(state), config.cache_path)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn data_endpoint_returns_labelled_rows() {
        let (app, cache) = app(
            StaticSource::with("GC=F", closes(260, 1900.0, 1.0)).and("SI=F", closes(260, 22.0, 0.0)),
        );
        let (status, body) = get_json(app, "/api/data").await;
        assert_eq!(status, StatusCode::OK);

        let daily = body["daily"].as_array().unwrap();
        assert_eq!(daily.len(), 260);
        assert_eq!(daily[0]["Date"], "2023-01-02");
        assert_eq!(daily[0]["XAU"], 1900.0);
        assert!(daily[0]["XAU_MA20"].is_null());
        assert!(daily[0]["XAU_Returns"].is_null());
        assert!(daily[259]["XAG_MA200"].is_number());
        assert_eq!(daily[0]["XAU_XAG_Ratio"], 1900.0 / 22.0);
        assert_eq!(daily[259]["Signal"], "Technical Bullish Zone (Entry Watch)");

        let weekly = body["weekly"].as_array().unwrap();
        assert!(!weekly.is_empty());
        assert!(weekly[0].get("XAU_XAG_Ratio").is_some());
        let _ = std::fs::remove_file(cache);
    }

    #[tokio::test]
    async fn analysis_endpoint_returns_summary() {
        let (app, cache) = app(
            StaticSource::with("GC=F", closes(260, 1900.0, 1.0)).and("SI=F", closes(260, 22.0, 0.0)),
        );
        let (status, body) = get_json(app, "/api/analysis").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["trend"], "Bullish");
        assert_eq!(body["prediction"]["outlook"], "Bullish Bias");
        assert_eq!(body["prediction"]["forecast_prices"].as_array().unwrap().len(), 7);
        assert_eq!(body["levels"]["xau"]["supports"][0], 1900.0);
        assert!(body["market_events"].is_array());
        for event in body["market_events"].as_array().unwrap() {
            for key in ["Type", "Date", "Description", "Significance", "magnitude"] {
                assert!(event.get(key).is_some(), "event missing {key}");
            }
        }
        assert!(body["momentum_text"].is_string());
        let _ = std::fs::remove_file(cache);
    }

    #[tokio::test]
    async fn analysis_events_use_dashboard_keys() {
        // Flat through February 2023, then a 10.5% step up from 1 March.
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let gold: Vec<DailyClose> = (0..120)
            .map(|d| {
                let date = start + Duration::days(d);
                let march = date >= NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
                DailyClose {
                    date,
                    close: Some(if march { 2100.0 } else { 1900.0 }),
                }
            })
            .collect();
        let (app, cache) = app(StaticSource::with("GC=F", gold).and("SI=F", closes(120, 22.0, 0.0)));
        let (status, body) = get_json(app, "/api/analysis").await;
        assert_eq!(status, StatusCode::OK);

        let events = body["market_events"].as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["Type"], "Rally");
        assert_eq!(events[0]["Date"], "2023-03");
        assert_eq!(events[0]["Significance"], "High");
        assert_eq!(events[0]["Description"], "Strong monthly gain of 10.5%");
        let _ = std::fs::remove_file(cache);
    }

    #[tokio::test]
    async fn failed_pipeline_is_500() {
        let (app, _) = app(StaticSource::default());
        let (status, body) = get_json(app.clone(), "/api/analysis").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to load data");

        let (status, _) = get_json(app, "/api/data").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let (app, _) = app(StaticSource::default());
        let (status, body) = get_json(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_snapshot"], false);
        assert!(body["snapshot_age_secs"].is_null());
    }

    #[test]
    fn number_maps_non_finite_to_null() {
        assert_eq!(number(Some(f64::NAN)), Value::Null);
        assert_eq!(number(None), Value::Null);
        assert_eq!(number(Some(1.5)), serde_json::json!(1.5));
    }
}
