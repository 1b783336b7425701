//! HTTP mapping for `TallyError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use tally_core::error::{ClientCode, TallyError};

/// Response wrapper so handlers can use `?` on core results.
#[derive(Debug)]
pub struct ApiError(pub TallyError);

impl From<TallyError> for ApiError {
    fn from(e: TallyError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.client_code() {
            ClientCode::InvalidKey | ClientCode::BadRequest | ClientCode::UnsupportedVersion => {
                StatusCode::BAD_REQUEST
            }
            ClientCode::NotFound => StatusCode::NOT_FOUND,
            ClientCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0.client_code().as_str(),
            "message": self.0.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
