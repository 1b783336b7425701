//! Axum router wiring.

use axum::{routing::get, Router};

use crate::{api::votes, app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/votes", get(votes::list_votes).post(votes::post_vote))
        .route(
            "/api/votes/",
            get(votes::get_blank).delete(votes::delete_blank),
        )
        .route(
            "/api/votes/:key",
            get(votes::get_vote).delete(votes::delete_vote),
        )
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .route("/ops/health", get(ops::health_reports))
        .with_state(state)
}
