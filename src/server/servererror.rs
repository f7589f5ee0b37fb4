use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Json,
        Response
    }
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::configuration::ConfigurationError;
use crate::fourier::fouriererror::FourierError;

/// 單一請求的錯誤；轉為 `{"error": "..."}` JSON 回應。
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid harmonic count: {0}")]
    InvalidHarmonicCount(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("harmonic count {requested} exceeds the maximum of {max}")]
    TooManyHarmonics { requested: usize, max: usize },

    #[error(transparent)]
    Computation(#[from] FourierError),

    #[error("calculation worker failed: {0}")]
    Worker(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidHarmonicCount(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyHarmonics { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// 啟動或執行伺服器時的錯誤。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
