//! Shared helpers for the integration tests: a local axum server standing in
//! for the catalog, plus token/session fixtures.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use chrono::Utc;
use loficli::{
    management::{TokenEndpoint, TokenManager},
    spotify::gateway::Gateway,
    types::Token,
};

/// Binds the router on an ephemeral local port and serves it in the
/// background for the remainder of the test.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub fn fresh_token(access: &str, refresh: &str) -> Token {
    Token {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        scope: String::new(),
        expires_in: 3600,
        obtained_at: Utc::now().timestamp() as u64,
    }
}

pub fn token_endpoint(addr: SocketAddr) -> TokenEndpoint {
    TokenEndpoint {
        url: format!("http://{addr}/api/token"),
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
    }
}

pub fn gateway_for(addr: SocketAddr, token: Token) -> Gateway {
    let tokens = TokenManager::new(token, token_endpoint(addr));
    Gateway::new(format!("http://{addr}"), tokens)
}
