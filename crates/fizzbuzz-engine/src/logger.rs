//! 引擎诊断日志能力
//!
//! 引擎通过构造时注入的 [`EngineLogger`] 报告校验失败，
//! 生产环境使用 [`TracingLogger`]，测试可替换为空实现或记录型实现。

use tracing::warn;

use crate::error::EngineError;

/// 诊断日志接口
#[cfg_attr(test, mockall::automock)]
pub trait EngineLogger: Send + Sync {
    /// 请求未通过校验时调用，每次失败恰好调用一次
    fn validation_failed(&self, error: &EngineError);
}

/// 基于 tracing 的默认实现
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl EngineLogger for TracingLogger {
    fn validation_failed(&self, error: &EngineError) {
        match error {
            EngineError::TooManyRules { count, max } => {
                warn!(code = error.code(), count, max, "Too many multiples in request");
            }
            EngineError::DuplicateDivisors(divisors) => {
                warn!(code = error.code(), duplicates = ?divisors, "Duplicates found in request");
            }
            EngineError::InvalidDivisor { divisor } => {
                warn!(code = error.code(), divisor, "Multiple must be greater than 0");
            }
            EngineError::WordRequired { divisor } => {
                warn!(code = error.code(), divisor, "WordToPrint is required");
            }
            EngineError::WordTooLong {
                divisor,
                length,
                max,
            } => {
                warn!(code = error.code(), divisor, length, max, "WordToPrint is too long");
            }
            EngineError::InvalidBound { bound } | EngineError::BoundTooLarge { bound, .. } => {
                warn!(code = error.code(), bound, "MaxNumber out of range");
            }
            EngineError::EmptyRequest => {
                warn!(code = error.code(), "Request is empty or null");
            }
        }
    }
}

/// 不输出任何日志
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl EngineLogger for NoopLogger {
    fn validation_failed(&self, _error: &EngineError) {}
}
