//! `/api/votes` handlers.
//!
//! Every handler goes through exactly one store call, so the store's request
//! counter sees one increment per HTTP request, rejected ones included.

use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use tally_core::error::{Result, TallyError};

use crate::app_state::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct VoteEntry {
    pub key: String,
    pub value: u64,
}

/// Start/stop bookkeeping for one API call.
struct Call<'a> {
    app: &'a AppState,
    op: &'static str,
    activity: u64,
    started: Instant,
}

impl<'a> Call<'a> {
    fn start(app: &'a AppState, op: &'static str) -> Self {
        let activity = app.next_activity();
        tracing::debug!(op, activity, "request start");
        Self {
            app,
            op,
            activity,
            started: Instant::now(),
        }
    }

    fn finish<T>(self, res: Result<T>) -> std::result::Result<T, ApiError> {
        let elapsed = self.started.elapsed();
        let outcome = match &res {
            Ok(_) => "ok",
            Err(TallyError::InvalidKey(_)) => "invalid_key",
            Err(TallyError::NotFound(_)) => "not_found",
            Err(_) => "error",
        };
        self.app.metrics().observe_api(self.op, outcome, elapsed);

        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        match &res {
            Err(e) if !e.is_client_error() => {
                tracing::error!(op = self.op, activity = self.activity, error = %e, micros, "request failed");
            }
            _ => {
                tracing::debug!(op = self.op, activity = self.activity, outcome, micros, "request stop");
            }
        }
        res.map_err(ApiError::from)
    }
}

pub async fn get_vote(
    State(app): State<AppState>,
    Path(key): Path<String>,
) -> std::result::Result<String, ApiError> {
    let call = Call::start(&app, "get");
    let count = call.finish(app.store().get(&key))?;
    Ok(count.to_string())
}

/// `GET /api/votes/`: key segment present but empty.
pub async fn get_blank(State(app): State<AppState>) -> std::result::Result<String, ApiError> {
    let call = Call::start(&app, "get");
    let count = call.finish(app.store().get(""))?;
    Ok(count.to_string())
}

pub async fn list_votes(State(app): State<AppState>) -> Json<Vec<VoteEntry>> {
    let call = Call::start(&app, "list");
    let votes = app.store().list();
    // list cannot fail; finish only records the call.
    let votes = call.finish(Ok(votes)).unwrap_or_default();
    Json(
        votes
            .into_iter()
            .map(|(key, value)| VoteEntry { key, value })
            .collect(),
    )
}

pub async fn post_vote(
    State(app): State<AppState>,
    body: Bytes,
) -> std::result::Result<StatusCode, ApiError> {
    let call = Call::start(&app, "post");
    let key = decode_key(&body);
    call.finish(app.store().increment(&key))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_vote(
    State(app): State<AppState>,
    Path(key): Path<String>,
) -> std::result::Result<StatusCode, ApiError> {
    let call = Call::start(&app, "delete");
    call.finish(app.store().delete(&key))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/votes/`: key segment present but empty.
pub async fn delete_blank(State(app): State<AppState>) -> std::result::Result<StatusCode, ApiError> {
    let call = Call::start(&app, "delete");
    call.finish(app.store().delete(""))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Body -> key. A JSON string literal is unquoted; anything else is taken
/// verbatim. Non-UTF-8 bodies and the JSON `null` literal become the empty
/// (missing) key.
fn decode_key(body: &[u8]) -> String {
    let Ok(raw) = std::str::from_utf8(body) else {
        return String::new();
    };
    if raw.trim() == "null" {
        return String::new();
    }
    if raw.starts_with('"') {
        if let Ok(key) = serde_json::from_str::<String>(raw) {
            return key;
        }
    }
    raw.to_owned()
}
