//! HTTP 层错误类型定义
//!
//! 所有错误都以 problem details（RFC 9457）格式返回，
//! `detail` 字段承载面向调用方的可读信息。

use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use fizzbuzz_engine::EngineError;
use http_body_util::LengthLimitError;
use serde::Serialize;

/// problem details 的媒体类型
pub const PROBLEM_JSON: &str = "application/problem+json";

/// HTTP 层错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 规则引擎校验失败
    #[error(transparent)]
    Validation(#[from] EngineError),

    /// 请求体不是合法的 JSON 或字段类型不匹配
    #[error("Invalid request body.")]
    InvalidBody(String),

    /// 请求体超过路由的大小上限
    #[error("Request body is too large.")]
    PayloadTooLarge(String),

    /// 读取请求体失败
    #[error("Failed to read request body.")]
    BodyRead(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// problem details 响应体
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
    pub code: &'static str,
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidBody(_) | Self::BodyRead(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于日志和 problem details 扩展字段）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::BodyRead(_) => "BODY_READ_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 构建 problem details
    ///
    /// 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露。
    pub fn problem(&self) -> ProblemDetails {
        let status = self.status_code();
        let (problem_type, title) = match status {
            StatusCode::BAD_REQUEST => (
                "https://tools.ietf.org/html/rfc9110#section-15.5.1",
                "Bad Request",
            ),
            StatusCode::PAYLOAD_TOO_LARGE => (
                "https://tools.ietf.org/html/rfc9110#section-15.5.14",
                "Content Too Large",
            ),
            _ => (
                "https://tools.ietf.org/html/rfc9110#section-15.6.1",
                "An error occurred while processing your request.",
            ),
        };

        let detail = match self {
            Self::Internal(_) => "服务内部错误，请稍后重试".to_string(),
            other => other.to_string(),
        };

        ProblemDetails {
            problem_type,
            title,
            status: status.as_u16(),
            detail,
            code: self.error_code(),
        }
    }
}

impl ApiError {
    /// 缓冲请求体失败时的错误，超出长度上限与处理器提取器的判定一致
    pub fn from_body_error(err: axum::Error) -> Self {
        if is_length_limit(&err) {
            Self::PayloadTooLarge(err.to_string())
        } else {
            Self::BodyRead(err.to_string())
        }
    }
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::BodyRead(rejection.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, "内部错误"),
            Self::InvalidBody(e) | Self::BodyRead(e) | Self::PayloadTooLarge(e) => {
                tracing::debug!(error = %e, code = self.error_code(), "Rejected request body")
            }
            Self::Validation(_) => {}
        }

        let mut response = (self.status_code(), axum::Json(self.problem())).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        response
    }
}
