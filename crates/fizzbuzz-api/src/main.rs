//! 广义 FizzBuzz HTTP 服务

use fizzbuzz_api::{AppState, routes, worker::CacheSweeper};
use fizzbuzz_shared::{config::AppConfig, observability};
use tokio::net::TcpListener;
use tracing::{info, warn};

const SERVICE_NAME: &str = "fizzbuzz-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig {
            service_name: SERVICE_NAME.to_string(),
            ..Default::default()
        }
    });

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!(
        environment = %config.environment,
        max_bound = config.engine.max_bound,
        cache_enabled = config.cache.enabled,
        cache_ttl_secs = config.cache.ttl_secs,
        "Starting {} on {}",
        config.service_name,
        config.server_addr()
    );

    if config.is_production() && config.cors.allowed_origins.iter().any(|o| o == "*") {
        warn!("CORS allows any origin in production");
    }

    let state = AppState::new(&config);

    if config.cache.enabled {
        let sweeper = CacheSweeper::new(state.cache.clone(), config.cache.sweep_interval());
        tokio::spawn(async move {
            sweeper.run().await;
        });
    }

    let app = routes::app(state, &config.cors);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
