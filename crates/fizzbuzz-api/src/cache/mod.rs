//! 输出缓存
//!
//! - `policy`: 请求到达和响应完成时的缓存决策（纯函数）
//! - `key`: 缓存键生成
//! - `store`: 进程内响应缓存与请求合并

pub mod key;
pub mod policy;
pub mod store;

pub use key::CacheKey;
pub use policy::{CacheDecision, CachePolicy, decide_caching, decide_storage};
pub use store::{CacheHit, CachedResponse, Coalesced, ResponseCache};
