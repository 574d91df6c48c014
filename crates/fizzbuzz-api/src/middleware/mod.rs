//! 中间件模块
//!
//! 提供输出缓存中间件

pub mod output_cache;

pub use output_cache::output_cache;
