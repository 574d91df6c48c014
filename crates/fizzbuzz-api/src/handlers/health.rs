//! 存活探针

use axum::Json;

/// 存活探针：服务进程正常即返回 Healthy
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "Healthy",
        "service": "fizzbuzz-api"
    }))
}
