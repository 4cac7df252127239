//! Country lookup for a player's network origin.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::net::IpAddr;
use tracing::{debug, warn};

use crate::packet::Player;
use crate::retry::{with_retry_if, RetryConfig};

#[async_trait]
pub trait Geolocation: Send + Sync {
    /// ISO 3166-1 alpha-2 region code of the player's origin, if known.
    async fn country_code(&self, player: &Player) -> Option<String>;
}

#[derive(Debug, thiserror::Error)]
enum LookupError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geolocation API returned {0}")]
    Status(StatusCode),
}

fn is_retryable(error: &LookupError) -> bool {
    match error {
        LookupError::Http(e) => e.is_timeout() || e.is_connect(),
        LookupError::Status(status) => {
            status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    status: String,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Addresses a public lookup service can say nothing about.
fn is_routable(address: &IpAddr) -> bool {
    match address {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            let unique_local = first & 0xfe00 == 0xfc00;
            let link_local = first & 0xffc0 == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}

/// Looks up countries through an ip-api compatible HTTP endpoint
/// (`GET {base}/json/{ip}?fields=status,countryCode,message`).
#[derive(Debug, Clone)]
pub struct HttpGeolocation {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpGeolocation {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryConfig::join_lookup(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn lookup(&self, address: IpAddr) -> Result<LookupResponse, LookupError> {
        let url = format!("{}/json/{}", self.base_url, address);
        let response = self
            .client
            .get(&url)
            .query(&[("fields", "status,countryCode,message")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Geolocation for HttpGeolocation {
    async fn country_code(&self, player: &Player) -> Option<String> {
        let address = player.address?;
        if !is_routable(&address) {
            debug!("Skipping geolocation for {} from {}", player.name, address);
            return None;
        }

        let result = with_retry_if(
            &self.retry,
            &format!("Geolocation for {}", player.name),
            || self.lookup(address),
            is_retryable,
        )
        .await;

        match result {
            Ok(response) if response.status == "success" => response
                .country_code
                .map(|code| code.trim().to_uppercase())
                .filter(|code| !code.is_empty()),
            Ok(response) => {
                debug!(
                    "No country for {} ({}): {}",
                    player.name,
                    address,
                    response.message.unwrap_or_default()
                );
                None
            }
            Err(e) => {
                warn!("Geolocation failed for {} ({}): {}", player.name, address, e);
                None
            }
        }
    }
}
