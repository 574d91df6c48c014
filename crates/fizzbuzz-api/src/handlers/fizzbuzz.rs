//! FizzBuzz 计算接口
//!
//! `POST /`，请求体示例：
//!
//! ```json
//! {"multiples": [{"multiple": 3, "wordToPrint": "Fizz"}, {"multiple": 5, "wordToPrint": "Buzz"}], "maxNumber": 16}
//! ```
//!
//! 成功返回：
//!
//! ```json
//! {"3": "Fizz", "5": "Buzz", "6": "Fizz", "9": "Fizz", "10": "Buzz", "12": "Fizz", "15": "FizzBuzz"}
//! ```

use std::time::Instant;

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
};
use fizzbuzz_engine::{FizzBuzzRequest, ResultMap};
use fizzbuzz_shared::observability::metrics;
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 校验请求并计算结果
#[instrument(skip_all)]
pub async fn process(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<ResultMap>> {
    let body = body?;
    let request = parse_request(&body)?;

    let start = Instant::now();
    let result = state.engine.process(request.as_ref());
    let elapsed = start.elapsed().as_secs_f64();

    match &result {
        Ok(_) => metrics::record_fizzbuzz("ok", elapsed),
        Err(e) => metrics::record_fizzbuzz(e.code(), elapsed),
    }

    Ok(Json(result?))
}

/// 解析请求体
///
/// 空请求体和 JSON `null` 视为请求缺失，交给引擎报告 "Request is empty."
fn parse_request(body: &[u8]) -> Result<Option<FizzBuzzRequest>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice::<Option<FizzBuzzRequest>>(body)
        .map_err(|e| ApiError::InvalidBody(e.to_string()))
}
