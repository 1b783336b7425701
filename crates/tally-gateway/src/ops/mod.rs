//! Operational HTTP endpoints.
//!
//! - `/healthz`     : liveness
//! - `/readyz`      : readiness (503 when draining)
//! - `/metrics`     : Prometheus text format
//! - `/ops/health`  : latest health reports and load held by the in-process sink

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let extra = state.metrics_extra();
    let body = state.metrics().render(&extra);

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

pub async fn health_reports(State(state): State<AppState>) -> Json<Value> {
    let snap = state.health_sink().snapshot();

    let reports: Vec<Value> = snap
        .reports
        .iter()
        .map(|r| {
            json!({
                "property": r.property,
                "sub_property": r.sub_property,
                "state": r.state.as_str(),
                "description": r.description,
                "ttl_ms": u64::try_from(r.time_to_live.as_millis()).unwrap_or(u64::MAX),
                "sequence_number": r.sequence_number,
                "remove_when_expired": r.remove_when_expired,
            })
        })
        .collect();
    let load: Vec<Value> = snap
        .load
        .iter()
        .map(|m| json!({ "name": m.name, "value": m.value }))
        .collect();

    Json(json!({
        "enabled": state.cfg().health.enabled,
        "max_key_length": state.store().options().max_key_length,
        "reports": reports,
        "load": load,
    }))
}
