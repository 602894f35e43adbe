use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{error::Error, types::Token};

/// Refresh margin in seconds: tokens are treated as expired slightly before
/// their advertised lifetime so in-flight requests do not race the deadline.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Where the refresh-token exchange goes and which client credentials it
/// carries. Injected at construction so tests can point the store at a mock
/// token endpoint.
#[derive(Debug, Clone)]
pub struct TokenEndpoint {
    pub url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl TokenEndpoint {
    pub fn from_config() -> Self {
        TokenEndpoint {
            url: crate::config::spotify_apitoken_url(),
            client_id: crate::config::spotify_client_id(),
            client_secret: crate::config::spotify_client_secret(),
        }
    }
}

/// Holds the session's token pair and refreshes it on demand.
///
/// The token lives behind an async mutex and is the only mutable shared
/// state in the process. Concurrent refreshes are allowed: the exchange runs
/// outside the lock, each successful exchange installs its result under the
/// lock, and an empty access token is never installed — so the store ends up
/// with whichever refresh completed last, never with a corrupted session.
#[derive(Clone)]
pub struct TokenManager {
    token: Arc<Mutex<Token>>,
    endpoint: TokenEndpoint,
    persisted: bool,
}

impl TokenManager {
    pub fn new(token: Token, endpoint: TokenEndpoint) -> Self {
        TokenManager {
            token: Arc::new(Mutex::new(token)),
            endpoint,
            persisted: false,
        }
    }

    /// Restores the session persisted by `loficli auth`. A missing or
    /// unreadable token file means there is no session for this principal.
    pub async fn load() -> Result<Self, Error> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|_| Error::Unauthenticated)?;
        let token: Token =
            serde_json::from_str(&content).map_err(|_| Error::Unauthenticated)?;
        if token.access_token.is_empty() {
            return Err(Error::Unauthenticated);
        }
        Ok(TokenManager {
            token: Arc::new(Mutex::new(token)),
            endpoint: TokenEndpoint::from_config(),
            persisted: true,
        })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let snapshot = self.token.lock().await.clone();
        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    /// Returns the live access token without touching the network.
    pub async fn access_token(&self) -> Result<String, Error> {
        let token = self.token.lock().await;
        if token.access_token.is_empty() {
            return Err(Error::Unauthenticated);
        }
        Ok(token.access_token.clone())
    }

    /// Returns an access token fit for an outbound call, refreshing first if
    /// the stored one is past its expiry margin and a refresh token exists.
    pub async fn valid_token(&self) -> Result<String, Error> {
        let (expired, refreshable) = {
            let token = self.token.lock().await;
            (Self::is_expired(&token), token.has_refresh_token())
        };

        if expired && refreshable {
            return self.refresh().await;
        }
        self.access_token().await
    }

    /// Exchanges the stored refresh token for a new access token and installs
    /// it as the live session. Returns the new access token.
    ///
    /// Safe under concurrent invocation: the winner by completion time sticks,
    /// and a failed or empty exchange leaves the previous token untouched.
    pub async fn refresh(&self) -> Result<String, Error> {
        let refresh_token = {
            let token = self.token.lock().await;
            if !token.has_refresh_token() {
                return Err(Error::NoRefreshToken);
            }
            token.refresh_token.clone()
        };

        let client = Client::new();
        let res = client
            .post(&self.endpoint.url)
            .basic_auth(&self.endpoint.client_id, Some(&self.endpoint.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::RefreshFailed(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(Error::RefreshFailed(format!("HTTP {status}: {body}")));
        }

        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| Error::RefreshFailed(e.to_string()))?;

        let access_token = json["access_token"].as_str().unwrap_or_default().to_string();
        if access_token.is_empty() {
            return Err(Error::RefreshFailed(
                "token endpoint returned no access_token".to_string(),
            ));
        }

        {
            let mut token = self.token.lock().await;
            token.access_token = access_token.clone();
            // The provider may rotate the refresh token; keep the old one
            // when the response omits it.
            if let Some(rotated) = json["refresh_token"].as_str() {
                if !rotated.is_empty() {
                    token.refresh_token = rotated.to_string();
                }
            }
            if let Some(scope) = json["scope"].as_str() {
                token.scope = scope.to_string();
            }
            token.expires_in = json["expires_in"].as_u64().unwrap_or(3600);
            token.obtained_at = Utc::now().timestamp() as u64;
        }

        if self.persisted {
            let _ = self.persist().await;
        }

        Ok(access_token)
    }

    /// Drops the persisted session. Subsequent `load` calls fail with
    /// `Unauthenticated` until the user authorizes again.
    pub async fn reset() -> Result<(), String> {
        let path = Self::token_path();
        match async_fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn is_expired(token: &Token) -> bool {
        let now = Utc::now().timestamp() as u64;
        now >= token.obtained_at + token.expires_in.saturating_sub(EXPIRY_MARGIN_SECS)
    }

    fn token_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("loficli/cache/token.json");
        path
    }
}
