mod common;

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};

use loficli::{
    error::Error,
    management::TokenManager,
    spotify::gateway::Gateway,
};

use common::{fresh_token, gateway_for, spawn_server, token_endpoint};

#[tokio::test]
async fn test_rate_limited_request_is_retried_after_advertised_delay() {
    let hits = Arc::new(AtomicUsize::new(0));
    let handler_hits = Arc::clone(&hits);

    let router = Router::new().route(
        "/ping",
        get(move || {
            let hits = Arc::clone(&handler_hits);
            async move {
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        [("retry-after", "2")],
                        "rate limited",
                    )
                        .into_response()
                } else {
                    Json(json!({ "ok": true })).into_response()
                }
            }
        }),
    );

    let addr = spawn_server(router).await;
    let gateway = gateway_for(addr, fresh_token("access-1", "refresh-1"));

    let start = Instant::now();
    let response: Value = gateway.get_json("/ping").await.unwrap();

    assert_eq!(response["ok"], json!(true));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    // the suspension honored the upstream's Retry-After hint
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test]
async fn test_excessive_retry_after_surfaces_instead_of_stalling() {
    let router = Router::new().route(
        "/ping",
        get(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                [("retry-after", "600")],
                "rate limited",
            )
        }),
    );

    let addr = spawn_server(router).await;
    let gateway = gateway_for(addr, fresh_token("access-1", "refresh-1"));

    let result: Result<Value, Error> = gateway.get_json("/ping").await;
    match result {
        Err(Error::Upstream { status, .. }) => assert_eq!(status, 429),
        other => panic!("expected bounded-retry upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_auth_rejection_triggers_exactly_one_refresh() {
    let refreshes = Arc::new(AtomicUsize::new(0));
    let handler_refreshes = Arc::clone(&refreshes);

    let router = Router::new()
        .route(
            "/secret",
            get(|headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|value| value.to_str().ok())
                    == Some("Bearer fresh-token");
                if authorized {
                    Json(json!({ "secret": 42 })).into_response()
                } else {
                    (StatusCode::UNAUTHORIZED, "token expired").into_response()
                }
            }),
        )
        .route(
            "/api/token",
            post(move || {
                let refreshes = Arc::clone(&handler_refreshes);
                async move {
                    refreshes.fetch_add(1, Ordering::SeqCst);
                    Json(json!({
                        "access_token": "fresh-token",
                        "expires_in": 3600
                    }))
                }
            }),
        );

    let addr = spawn_server(router).await;
    let gateway = gateway_for(addr, fresh_token("stale-token", "refresh-1"));

    let response: Value = gateway.get_json("/secret").await.unwrap();

    assert_eq!(response["secret"], json!(42));
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_auth_rejection_without_refresh_token_surfaces_original_status() {
    let refreshes = Arc::new(AtomicUsize::new(0));
    let handler_refreshes = Arc::clone(&refreshes);

    let router = Router::new()
        .route(
            "/secret",
            get(|| async { (StatusCode::UNAUTHORIZED, "token expired") }),
        )
        .route(
            "/api/token",
            post(move || {
                let refreshes = Arc::clone(&handler_refreshes);
                async move {
                    refreshes.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "access_token": "unreachable" }))
                }
            }),
        );

    let addr = spawn_server(router).await;
    let gateway = gateway_for(addr, fresh_token("stale-token", ""));

    let result: Result<Value, Error> = gateway.get_json("/secret").await;
    match result {
        Err(Error::Upstream { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "token expired");
        }
        other => panic!("expected the original 401, got {other:?}"),
    }
    // no refresh token means the exchange is never attempted
    assert_eq!(refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_client_errors_surface_without_retry() {
    let hits = Arc::new(AtomicUsize::new(0));
    let handler_hits = Arc::clone(&hits);

    let router = Router::new().route(
        "/missing",
        get(move || {
            let hits = Arc::clone(&handler_hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (StatusCode::NOT_FOUND, "no such thing")
            }
        }),
    );

    let addr = spawn_server(router).await;
    let gateway = gateway_for(addr, fresh_token("access-1", "refresh-1"));

    let result: Result<Value, Error> = gateway.get_json("/missing").await;
    match result {
        Err(Error::Upstream { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such thing");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_refresh_without_refresh_token_fails_fast() {
    // endpoint is never contacted; any address will do
    let addr = spawn_server(Router::new()).await;
    let manager = TokenManager::new(fresh_token("access-1", ""), token_endpoint(addr));

    let result = manager.refresh().await;
    assert!(matches!(result, Err(Error::NoRefreshToken)));
}

#[tokio::test]
async fn test_concurrent_refreshes_never_corrupt_the_session() {
    let counter = Arc::new(AtomicUsize::new(0));
    let handler_counter = Arc::clone(&counter);

    let router = Router::new().route(
        "/api/token",
        post(move || {
            let counter = Arc::clone(&handler_counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Json(json!({
                    "access_token": format!("fresh-{n}"),
                    "expires_in": 3600
                }))
            }
        }),
    );

    let addr = spawn_server(router).await;
    let manager = TokenManager::new(fresh_token("stale", "refresh-1"), token_endpoint(addr));

    let a = manager.clone();
    let b = manager.clone();
    let (first, second) = tokio::join!(
        tokio::spawn(async move { a.refresh().await }),
        tokio::spawn(async move { b.refresh().await }),
    );
    first.unwrap().unwrap();
    second.unwrap().unwrap();

    // whichever refresh completed last wins; the store is never left empty
    let installed = manager.access_token().await.unwrap();
    assert!(installed.starts_with("fresh-"));
}

#[tokio::test]
async fn test_gateway_attaches_bearer_token() {
    let router = Router::new().route(
        "/echo",
        get(|headers: HeaderMap| async move {
            let auth = headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(json!({ "authorization": auth }))
        }),
    );

    let addr = spawn_server(router).await;
    let gateway: Gateway = gateway_for(addr, fresh_token("access-1", "refresh-1"));

    let response: Value = gateway.get_json("/echo").await.unwrap();
    assert_eq!(response["authorization"], json!("Bearer access-1"));
}
