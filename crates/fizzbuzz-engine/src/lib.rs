//! FizzBuzz 规则引擎
//!
//! 根据一组 (除数, 单词) 规则和上界计算广义 FizzBuzz 序列：
//! - 请求校验（规则数量、重复除数、除数/单词/上界合法性）
//! - 按规则输入顺序拼接单词
//! - 通过可注入的日志能力记录校验失败
//!
//! 引擎本身无状态、无 I/O，可在任意线程中并发调用。

pub mod engine;
pub mod error;
pub mod logger;
pub mod models;

pub use engine::{EngineLimits, FizzBuzzEngine};
pub use error::{EngineError, Result};
pub use logger::{EngineLogger, NoopLogger, TracingLogger};
pub use models::{FizzBuzzRequest, ResultMap, Rule};
