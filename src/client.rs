//! Async client for the proxycheck.io detection and dashboard APIs.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{CheckOptions, CheckTarget, DetectionsQuery};
use crate::normalize::normalize_usage;
use crate::request::{self, PreparedRequest, FORM_CONTENT_TYPE};

/// Client for the proxycheck.io API.
///
/// Every operation issues exactly one HTTP request and hands back the
/// decoded JSON body. Nothing is cached or retried, and HTTP status codes
/// are not inspected: a remote error arrives as an ordinary payload whose
/// `status` field can be read with [`crate::ApiStatus::of`].
///
/// The client is cheap to clone and safe to share between tasks; its only
/// state is the immutable configuration and a pooled `reqwest::Client`.
///
/// ```no_run
/// use proxycheck::{CheckOptions, ProxyCheckClient};
///
/// # async fn example() -> Result<(), proxycheck::ProxyCheckError> {
/// let client = ProxyCheckClient::new("your-api-key")?;
/// let result = client.check("8.8.8.8", &CheckOptions::new().vpn().asn()).await?;
/// println!("{}", result["8.8.8.8"]["proxy"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProxyCheckClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl ProxyCheckClient {
    /// Creates a client with default endpoints.
    ///
    /// No network activity happens here.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(api_key)?)
    }

    /// Creates a client configured from `PROXYCHECK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Creates a client, building an HTTP client from the configured user
    /// agent and timeout.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Creates a client around an existing `reqwest::Client`.
    ///
    /// The configured user agent and timeout are not applied; the supplied
    /// client's own settings win.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Looks up one address (GET) or a batch of addresses (POST).
    ///
    /// Returns the service's JSON verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProxyCheckError::HttpRequest`] on transport failure
    /// and [`crate::ProxyCheckError::JsonParse`] if the body is not JSON.
    #[instrument(skip_all, fields(operation = "check"))]
    pub async fn check(
        &self,
        target: impl Into<CheckTarget>,
        options: &CheckOptions,
    ) -> Result<Value> {
        let target = target.into();
        let prepared = request::check_request(&self.config, &target, options)?;
        if let CheckTarget::Batch(ips) = &target {
            debug!(
                url = %prepared.redacted_url(),
                addresses = ips.len(),
                "batch check"
            );
        }
        self.send(prepared).await
    }

    /// Fetches account usage with keys normalized to `snake_case` and
    /// numeric strings converted to integers.
    #[instrument(skip_all, fields(operation = "usage"))]
    pub async fn get_usage(&self) -> Result<Value> {
        let prepared = request::usage_request(&self.config)?;
        let raw = self.send(prepared).await?;
        Ok(normalize_usage(raw))
    }

    /// Fetches the recent query log.
    #[instrument(skip_all, fields(operation = "queries"))]
    pub async fn get_queries(&self) -> Result<Value> {
        let prepared = request::queries_request(&self.config)?;
        self.send(prepared).await
    }

    /// Fetches positive detections, paged by `query`.
    #[instrument(skip_all, fields(operation = "detections", limit = query.limit, offset = query.offset))]
    pub async fn get_detections(&self, query: &DetectionsQuery) -> Result<Value> {
        let prepared = request::detections_request(&self.config, query)?;
        self.send(prepared).await
    }

    async fn send(&self, prepared: PreparedRequest) -> Result<Value> {
        debug!(
            method = %prepared.method,
            url = %prepared.redacted_url(),
            "sending request"
        );

        let operation = prepared.operation;
        let mut builder = self.http.request(prepared.method, prepared.url);
        if let Some(body) = prepared.form {
            builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(operation, %status, "non-success status, decoding body anyway");
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
