//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。
//! 未安装 recorder 时（如单元测试中）所有记录函数都是空操作。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册通用指标描述，会出现在 /metrics 端点的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!(
        "fizzbuzz_requests_total",
        "Total number of FizzBuzz computations by outcome"
    );
    metrics::describe_histogram!(
        "fizzbuzz_compute_duration_seconds",
        "FizzBuzz validation and computation duration in seconds"
    );

    metrics::describe_counter!(
        "output_cache_lookups_total",
        "Total number of output cache lookups by result"
    );
    metrics::describe_gauge!("output_cache_entries", "Number of entries in the output cache");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录一次 FizzBuzz 计算
///
/// `outcome` 为 "ok" 或校验错误码（如 "DUPLICATE_DIVISORS"）。
#[inline]
pub fn record_fizzbuzz(outcome: &'static str, duration_secs: f64) {
    metrics::counter!("fizzbuzz_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("fizzbuzz_compute_duration_seconds", "outcome" => outcome)
        .record(duration_secs);
}

/// 记录输出缓存查找结果（hit / miss / bypass）
#[inline]
pub fn record_cache_lookup(result: &'static str) {
    metrics::counter!("output_cache_lookups_total", "result" => result).increment(1);
}

/// 设置当前缓存条目数
#[inline]
pub fn set_cache_entries(count: usize) {
    metrics::gauge!("output_cache_entries").set(count as f64);
}
