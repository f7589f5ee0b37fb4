use std::time::Instant;

use axum::extract::{
    rejection::QueryRejection,
    Query,
    State
};
use axum::response::Json;
use serde::Deserialize;
use tracing::{
    info,
    info_span,
    Instrument
};
use uuid::Uuid;

use crate::fourier::fouriercoefficients::FourierCoefficients;
use crate::server::servererror::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CoefficientsQuery {
    n: Option<String>
}

/// 解析查詢參數 `n`：缺省時取 `default`；非整數、負數或超過 `max` 皆拒絕。
pub fn parse_harmonics(raw: Option<&str>, default: usize, max: usize) -> Result<usize, ApiError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::InvalidHarmonicCount(format!("'{}' is not an integer", raw)))?;
    if value < 0 {
        return Err(ApiError::InvalidHarmonicCount(format!("{} is negative", value)));
    }
    let requested = usize::try_from(value)
        .map_err(|_| ApiError::InvalidHarmonicCount(format!("{} is out of range", value)))?;
    if requested > max {
        return Err(ApiError::TooManyHarmonics { requested, max });
    }
    Ok(requested)
}

/// GET /fourier_coefficients?n=<int>
pub async fn fourier_coefficients(
    State(state): State<AppState>,
    query: Result<Query<CoefficientsQuery>, QueryRejection>,
) -> Result<Json<FourierCoefficients>, ApiError> {
    // 抽取失敗（例如重複的 `n`）也以 JSON 錯誤回應
    let Query(query) = query.map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))?;
    let harmonics = parse_harmonics(
        query.n.as_deref(),
        state.fourier().default_harmonics(),
        state.fourier().max_harmonics()
    )?;

    let request_id = Uuid::new_v4();
    let span = info_span!("fourier_coefficients", %request_id, harmonics);
    let started = Instant::now();

    // 積分為 CPU-bound，交給 blocking pool
    let worker_span = span.clone();
    let coefficients = tokio::task::spawn_blocking(move || {
        worker_span.in_scope(|| state.compute(harmonics))
    })
    .instrument(span.clone())
    .await
    .map_err(|error| ApiError::Worker(error.to_string()))??;

    span.in_scope(|| {
        info!(elapsed_ms = started.elapsed().as_millis() as u64, a0 = coefficients.a0(), "coefficients computed");
    });
    Ok(Json(coefficients))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
