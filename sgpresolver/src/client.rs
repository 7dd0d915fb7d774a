//! HTTP client resolving hosted pages to direct audio URLs
//!
//! # Example
//!
//! ```no_run
//! use sgpresolver::ResolverClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ResolverClient::builder()
//!         .timeout(Duration::from_secs(10))
//!         .build()?;
//!
//!     let resolution = client.resolve("https://soundgasm.net/u/someone/track").await?;
//!     println!("Audio: {}", resolution.audio_url);
//!
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::extract::Extractor;
use crate::models::Resolution;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default allowed host suffix
pub const DEFAULT_ALLOWED_HOST_SUFFIX: &str = "soundgasm.net";

/// Default timeout for page fetches (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent sent with every page fetch
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; SoundgasmResolver/1.0)";

/// Page resolver client
///
/// The client is stateless: every call fetches the page again, nothing is
/// cached between requests.
#[derive(Debug, Clone)]
pub struct ResolverClient {
    client: Client,
    allowed_host_suffix: String,
    user_agent: String,
    extractor: Extractor,
}

impl ResolverClient {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Domain suffix accepted by [`ResolverClient::validate_page_url`]
    pub fn allowed_host_suffix(&self) -> &str {
        &self.allowed_host_suffix
    }

    /// Check that `page_url` is a URL on the allowed domain
    ///
    /// The host must equal the allowed suffix or end with `.<suffix>`,
    /// compared case-insensitively.
    pub fn validate_page_url(&self, page_url: &str) -> Result<Url> {
        if page_url.is_empty() {
            return Err(Error::MissingParameter);
        }

        let url = Url::parse(page_url)?;
        let host = url.host_str().unwrap_or_default().to_lowercase();
        let allowed = self.allowed_host_suffix.to_lowercase();

        if host == allowed || host.ends_with(&format!(".{}", allowed)) {
            Ok(url)
        } else {
            Err(Error::ForbiddenHost {
                host,
                allowed: self.allowed_host_suffix.clone(),
            })
        }
    }

    /// Resolve a page URL into its audio URL and title
    pub async fn resolve(&self, page_url: &str) -> Result<Resolution> {
        let url = self.validate_page_url(page_url)?;

        debug!("Fetching page {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "text/html")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Page fetch for {} returned {}", url, status);
            return Err(Error::UpstreamFetchFailed {
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        self.resolve_html(&html)
    }

    /// Run the extraction patterns over an already fetched page
    pub fn resolve_html(&self, html: &str) -> Result<Resolution> {
        let title = self.extractor.title(html);
        let audio_url = self.extractor.audio_url(html).ok_or(Error::AudioNotFound)?;

        debug!("Resolved audio URL {} (title: {:?})", audio_url, title);
        Ok(Resolution::new(audio_url, title))
    }
}

/// Builder for [`ResolverClient`]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    client: Option<Client>,
    allowed_host_suffix: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            allowed_host_suffix: DEFAULT_ALLOWED_HOST_SUFFIX.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the allowed host suffix (e.g. `soundgasm.net`)
    pub fn allowed_host_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.allowed_host_suffix = suffix.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ResolverClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder().timeout(self.timeout).build()?,
        };

        Ok(ResolverClient {
            client,
            allowed_host_suffix: self.allowed_host_suffix,
            user_agent: self.user_agent,
            extractor: Extractor::new()?,
        })
    }
}
