//! 广义 FizzBuzz HTTP 服务
//!
//! 根据调用方提供的 (除数, 单词) 规则和上界计算 FizzBuzz 序列，
//! 并为幂等的 POST 接口提供进程内输出缓存。
//!
//! ## 模块结构
//!
//! - `cache`: 缓存策略、缓存键和响应缓存
//! - `error`: 错误类型与 problem details 响应
//! - `handlers`: HTTP 请求处理器
//! - `middleware`: 输出缓存中间件
//! - `routes`: 路由配置
//! - `state`: 应用状态
//! - `worker`: 后台任务
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 缓存：DashMap + tokio OnceCell（请求合并）
//! - 序列化：serde（沿用 camelCase 协议字段）

pub mod cache;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod worker;

pub use error::{ApiError, ProblemDetails, Result};
pub use state::AppState;
