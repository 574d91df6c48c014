//! HTTP 接口集成测试
//!
//! 通过 tower oneshot 驱动完整路由（含 CORS、请求 ID 和输出缓存中间件）。

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use fizzbuzz_api::{AppState, routes};
use fizzbuzz_engine::{EngineLimits, FizzBuzzEngine, NoopLogger};
use fizzbuzz_shared::config::{AppConfig, CacheConfig, CorsConfig};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

const FIZZ_BUZZ_16: &str = r#"{"multiples":[{"multiple":3,"wordToPrint":"Fizz"},{"multiple":5,"wordToPrint":"Buzz"}],"maxNumber":16}"#;

fn app() -> Router {
    let config = AppConfig::default();
    routes::app(AppState::new(&config), &config.cors)
}

fn app_with(limits: EngineLimits, cache: CacheConfig) -> Router {
    let engine = FizzBuzzEngine::with_limits(limits, Arc::new(NoopLogger));
    routes::app(AppState::with_engine(engine, &cache), &CorsConfig::default())
}

fn post(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn problem(response: Response) -> Value {
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    serde_json::from_str(&body_string(response).await).unwrap()
}

// ==================== 计算接口 ====================

#[tokio::test]
async fn test_post_returns_ordered_result() {
    let response = app().oneshot(post(FIZZ_BUZZ_16)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    assert_eq!(
        body_string(response).await,
        r#"{"3":"Fizz","5":"Buzz","6":"Fizz","9":"Fizz","10":"Buzz","12":"Fizz","15":"FizzBuzz"}"#
    );
}

#[tokio::test]
async fn test_post_default_bound() {
    let response = app()
        .oneshot(post(r#"{"multiples":[{"multiple":50,"wordToPrint":"Half"}]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, r#"{"50":"Half","100":"Half"}"#);
}

#[tokio::test]
async fn test_post_no_matches_returns_empty_object() {
    let response = app()
        .oneshot(post(r#"{"multiples":[{"multiple":7,"wordToPrint":"Bazz"}],"maxNumber":6}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "{}");
}

// ==================== 校验错误 ====================

#[tokio::test]
async fn test_empty_body_is_empty_request() {
    let response = app().oneshot(post("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem = problem(response).await;
    assert_eq!(problem["status"], 400);
    assert_eq!(problem["detail"], "Request is empty.");
    assert_eq!(problem["code"], "REQUEST_EMPTY");
}

#[tokio::test]
async fn test_empty_rules_is_empty_request() {
    let response = app()
        .oneshot(post(r#"{"multiples":[],"maxNumber":10}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(problem(response).await["detail"], "Request is empty.");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let response = app().oneshot(post("{\"multiples\": [")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem = problem(response).await;
    assert_eq!(problem["detail"], "Invalid request body.");
    assert_eq!(problem["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_pascal_case_field_names_accepted() {
    let response = app()
        .oneshot(post(
            r#"{"Multiples":[{"Multiple":3,"WordToPrint":"Fizz"}],"MaxNumber":6}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, r#"{"3":"Fizz","6":"Fizz"}"#);
}

#[tokio::test]
async fn test_divisor_outside_i32_rejected() {
    let response = app()
        .oneshot(post(
            r#"{"multiples":[{"multiple":3000000000,"wordToPrint":"Big"}],"maxNumber":6}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(problem(response).await["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_duplicates_reported() {
    let body = r#"{"multiples":[{"multiple":3,"wordToPrint":"Fizz"},{"multiple":5,"wordToPrint":"Buzz"},{"multiple":3,"wordToPrint":"Again"},{"multiple":5,"wordToPrint":"Again"}],"maxNumber":10}"#;
    let response = app().oneshot(post(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(problem(response).await["detail"], "Duplicates found. 3, 5");
}

#[tokio::test]
async fn test_invalid_rule_fields() {
    let cases = [
        (
            r#"{"multiples":[{"multiple":0,"wordToPrint":"Zero"}],"maxNumber":10}"#,
            "Multiple must be greater than 0.",
        ),
        (
            r#"{"multiples":[{"multiple":3,"wordToPrint":"   "}],"maxNumber":10}"#,
            "Word is required.",
        ),
        (
            r#"{"multiples":[{"multiple":3}],"maxNumber":10}"#,
            "Word is required.",
        ),
        (
            r#"{"multiples":[{"multiple":3,"wordToPrint":"Fizz"}],"maxNumber":0}"#,
            "MaxNumber must be greater than 0.",
        ),
    ];

    for (body, detail) in cases {
        let response = app().oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(problem(response).await["detail"], detail, "{}", body);
    }
}

#[tokio::test]
async fn test_bound_above_configured_limit() {
    let app = app_with(EngineLimits::default().with_max_bound(50), CacheConfig::default());
    let response = app
        .oneshot(post(r#"{"multiples":[{"multiple":3,"wordToPrint":"Fizz"}],"maxNumber":51}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem = problem(response).await;
    assert_eq!(problem["detail"], "MaxNumber must be less than or equal to 50.");
    assert_eq!(problem["code"], "BOUND_TOO_LARGE");
}

// ==================== 输出缓存 ====================

#[tokio::test]
async fn test_repeated_post_served_from_cache() {
    let app = app();

    let first = app.clone().oneshot(post(FIZZ_BUZZ_16)).await.unwrap();
    assert_eq!(first.headers().get("x-cache").unwrap(), "MISS");
    let first_body = body_string(first).await;

    let second = app.oneshot(post(FIZZ_BUZZ_16)).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers().get("x-cache").unwrap(), "HIT");
    assert!(second.headers().get(header::AGE).is_some());
    assert_eq!(body_string(second).await, first_body);
}

#[tokio::test]
async fn test_different_bodies_not_conflated() {
    let app = app();

    let first = app.clone().oneshot(post(FIZZ_BUZZ_16)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let other = r#"{"multiples":[{"multiple":2,"wordToPrint":"Even"}],"maxNumber":4}"#;
    let second = app.oneshot(post(other)).await.unwrap();
    assert_eq!(second.headers().get("x-cache").unwrap(), "MISS");
    assert_eq!(body_string(second).await, r#"{"2":"Even","4":"Even"}"#);
}

#[tokio::test]
async fn test_validation_errors_not_cached() {
    let app = app();
    let body = r#"{"multiples":[{"multiple":-1,"wordToPrint":"Neg"}],"maxNumber":10}"#;

    for _ in 0..2 {
        let response = app.clone().oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get("x-cache").unwrap(), "MISS");
    }
}

#[tokio::test]
async fn test_cache_disabled() {
    let cache = CacheConfig {
        enabled: false,
        ..Default::default()
    };
    let app = app_with(EngineLimits::default(), cache);

    for _ in 0..2 {
        let response = app.clone().oneshot(post(FIZZ_BUZZ_16)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("x-cache").is_none());
    }
}

// ==================== 请求体上限 ====================

fn cache_toggle(enabled: bool) -> CacheConfig {
    CacheConfig {
        enabled,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_oversized_body_same_with_and_without_cache() {
    for enabled in [true, false] {
        let engine = FizzBuzzEngine::with_limits(EngineLimits::default(), Arc::new(NoopLogger));
        let state = AppState::with_engine(engine, &cache_toggle(enabled)).with_max_body_bytes(64);
        let app = routes::app(state, &CorsConfig::default());

        let response = app.oneshot(post(FIZZ_BUZZ_16)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::PAYLOAD_TOO_LARGE,
            "cache enabled: {}",
            enabled
        );
        let problem = problem(response).await;
        assert_eq!(problem["detail"], "Request body is too large.", "cache enabled: {}", enabled);
    }
}

#[tokio::test]
async fn test_large_valid_body_same_with_and_without_cache() {
    // 超过 1 MiB 但在默认上限内的合法请求体
    let padding = " ".repeat(1_500_000);
    let body = format!("{}{}", FIZZ_BUZZ_16, padding);

    for enabled in [true, false] {
        let app = app_with(EngineLimits::default(), cache_toggle(enabled));
        let response = app.oneshot(post(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "cache enabled: {}", enabled);
    }
}

// ==================== 其他路由 ====================

#[tokio::test]
async fn test_health_check() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-cache").is_none());
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "Healthy");
}

#[tokio::test]
async fn test_unsupported_method() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri("/")
                .body(Body::from(FIZZ_BUZZ_16))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().get("x-cache").is_none());
}

#[tokio::test]
async fn test_request_id_echoed() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header("x-request-id", "req-42")
                .body(Body::from(FIZZ_BUZZ_16))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/")
                .header(header::ORIGIN, "http://localhost:4200")
                .body(Body::from(FIZZ_BUZZ_16))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:4200"
    );
}
