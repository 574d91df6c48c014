//! 规则引擎错误类型
//!
//! 错误的 Display 文本直接作为 problem details 的 `detail` 返回给调用方，
//! 文案保持与既有客户端兼容，修改前需确认前端是否依赖。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Request is empty.")]
    EmptyRequest,

    #[error("Too many multiples")]
    TooManyRules { count: usize, max: usize },

    #[error("Duplicates found. {}", join_divisors(.0))]
    DuplicateDivisors(Vec<i32>),

    #[error("Multiple must be greater than 0.")]
    InvalidDivisor { divisor: i32 },

    #[error("Word is required.")]
    WordRequired { divisor: i32 },

    #[error("Word must be less than or equal to {max} characters.")]
    WordTooLong {
        divisor: i32,
        length: usize,
        max: usize,
    },

    #[error("MaxNumber must be greater than 0.")]
    InvalidBound { bound: i32 },

    #[error("MaxNumber must be less than or equal to {max}.")]
    BoundTooLarge { bound: i32, max: i32 },
}

pub type Result<T> = std::result::Result<T, EngineError>;

fn join_divisors(divisors: &[i32]) -> String {
    divisors
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl EngineError {
    /// 获取错误码（用于日志和指标标签）
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyRequest => "REQUEST_EMPTY",
            Self::TooManyRules { .. } => "TOO_MANY_RULES",
            Self::DuplicateDivisors(_) => "DUPLICATE_DIVISORS",
            Self::InvalidDivisor { .. } => "INVALID_DIVISOR",
            Self::WordRequired { .. } => "WORD_REQUIRED",
            Self::WordTooLong { .. } => "WORD_TOO_LONG",
            Self::InvalidBound { .. } => "INVALID_BOUND",
            Self::BoundTooLarge { .. } => "BOUND_TOO_LARGE",
        }
    }
}
