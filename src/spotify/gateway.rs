use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode, header::HeaderMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{error::Error, management::TokenManager};

/// Upper bound on a single rate-limit wait. A `Retry-After` beyond this is
/// treated as an outage rather than throttling and surfaces as an upstream
/// error instead of stalling the pipeline.
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Delay assumed when a 429 response carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

enum Payload {
    Empty,
    Json(serde_json::Value),
    Raw {
        body: String,
        content_type: &'static str,
    },
}

/// Rate-limit-aware HTTP calling convention for the catalog.
///
/// Every request is augmented with `Authorization: Bearer <token>` from the
/// session store. On 429 the calling task sleeps for the advertised delay and
/// re-issues the identical request; consecutive 429s re-enter the same rule,
/// each wait gated by the upstream's own hint. On 401/403 the gateway
/// triggers one token refresh and retries once with the new token; if the
/// refresh is unavailable or fails, the original rejection surfaces. All
/// other non-2xx responses surface as `Error::Upstream` without retry.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    tokens: TokenManager,
}

impl Gateway {
    /// `base_url` is the API root without a trailing slash; it is injected
    /// here (rather than read from config inside) so tests can point the
    /// gateway at a local mock server.
    pub fn new(base_url: impl Into<String>, tokens: TokenManager) -> Self {
        Gateway {
            client: Client::new(),
            base_url: base_url.into(),
            tokens,
        }
    }

    pub fn from_config(tokens: TokenManager) -> Self {
        Self::new(crate::config::spotify_apiurl(), tokens)
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let response = self.execute(Method::GET, path, &Payload::Empty).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::Config(format!("unserializable request body: {e}")))?;
        let response = self
            .execute(Method::POST, path, &Payload::Json(value))
            .await?;
        Ok(response.json::<T>().await?)
    }

    /// PUT with a verbatim body, used for the base64 cover-image upload.
    pub async fn put_raw(
        &self,
        path: &str,
        body: String,
        content_type: &'static str,
    ) -> Result<(), Error> {
        self.execute(Method::PUT, path, &Payload::Raw { body, content_type })
            .await?;
        Ok(())
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: &Payload,
    ) -> Result<Response, Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut refreshed = false;

        loop {
            let token = self.tokens.valid_token().await?;
            let mut request = self.client.request(method.clone(), &url).bearer_auth(token);
            request = match payload {
                Payload::Empty => request,
                Payload::Json(value) => request.json(value),
                Payload::Raw { body, content_type } => request
                    .header(reqwest::header::CONTENT_TYPE, *content_type)
                    .body(body.clone()),
            };

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let delay = retry_after_secs(response.headers());
                if delay > MAX_RETRY_AFTER_SECS {
                    return Err(Error::Upstream {
                        status: status.as_u16(),
                        body: format!(
                            "retry-after of {delay}s exceeds the {MAX_RETRY_AFTER_SECS}s bound"
                        ),
                    });
                }
                sleep(Duration::from_secs(delay)).await;
                continue;
            }

            if (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
                && !refreshed
            {
                let body = response.text().await.unwrap_or_default();
                match self.tokens.refresh().await {
                    Ok(_) => {
                        refreshed = true;
                        continue;
                    }
                    // No refresh token, or the exchange failed: surface the
                    // original rejection, not the refresh failure.
                    Err(_) => {
                        return Err(Error::Upstream {
                            status: status.as_u16(),
                            body,
                        });
                    }
                }
            }

            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }
    }
}

fn retry_after_secs(headers: &HeaderMap) -> u64 {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
