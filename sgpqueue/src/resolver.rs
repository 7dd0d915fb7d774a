//! Resolver port used by the queue controller
//!
//! [`HttpResolver`] talks to a running resolver service over HTTP.
//! [`sgpresolver::ResolverClient`] also implements [`TrackResolver`] so the
//! queue can resolve pages in-process.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sgpresolver::Resolution;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default resolver service location
pub const DEFAULT_RESOLVER_URL: &str = "http://localhost:8080";

/// Default timeout for resolver calls (30 seconds)
pub const DEFAULT_RESOLVER_TIMEOUT_SECS: u64 = 30;

/// Turns a page URL into a playable audio URL
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, page_url: &str) -> Result<Resolution>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveResponse {
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Client of the `GET /resolve?url=` endpoint
#[derive(Debug, Clone)]
pub struct HttpResolver {
    client: Client,
    endpoint: Url,
}

impl HttpResolver {
    /// `base_url` is the service root, e.g. `http://localhost:8080`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_RESOLVER_TIMEOUT_SECS))
            .build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let endpoint = Url::parse(&format!("{}/resolve", base_url.trim_end_matches('/')))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl TrackResolver for HttpResolver {
    async fn resolve(&self, page_url: &str) -> Result<Resolution> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("url", page_url);

        debug!("Resolving {} via {}", page_url, self.endpoint);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(Error::ResolverStatus {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ResolveResponse = serde_json::from_str(&body)?;
        match parsed.audio_url {
            Some(audio_url) if !audio_url.is_empty() => Ok(Resolution::new(audio_url, parsed.title)),
            _ => Err(Error::MissingAudioUrl),
        }
    }
}

#[async_trait]
impl TrackResolver for sgpresolver::ResolverClient {
    async fn resolve(&self, page_url: &str) -> Result<Resolution> {
        Ok(sgpresolver::ResolverClient::resolve(self, page_url).await?)
    }
}
