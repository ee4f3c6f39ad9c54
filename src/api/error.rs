// =============================================================================
// API Errors — every failure maps to a status code and a JSON body
// =============================================================================
//
// Body shape: { "error": "<message>" }
//
// Data-source failures keep their own status so the dashboard can tell "no
// credentials" apart from "Schwab said no" apart from "the market is ranging".
// =============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::warn;

use crate::market_data::CandleError;
use crate::schwab::SchwabError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Schwab client not ready.")]
    NotReady,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Schwab(#[from] SchwabError),

    #[error(transparent)]
    Candles(#[from] CandleError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotReady => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Schwab(SchwabError::Upstream { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Schwab(SchwabError::Token { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Schwab(_) => StatusCode::BAD_GATEWAY,
            Self::Candles(CandleError::Empty) => StatusCode::NOT_FOUND,
            Self::Candles(CandleError::Malformed { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self, "request failed");
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
