//! Client configuration.
//!
//! Holds the credential and the two endpoint bases the client talks to.
//! Everything except the API key has a default, and each can be
//! overridden from the environment or with the `with_*` setters.

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{ProxyCheckError, Result};

/// Base URL of the detection API.
pub const DEFAULT_API_BASE: &str = "https://proxycheck.io/v2/";
/// Base URL of the dashboard export API.
pub const DEFAULT_DASHBOARD_BASE: &str = "https://proxycheck.io/dashboard/export/";

const ENV_API_KEY: &str = "PROXYCHECK_API_KEY";
const ENV_API_BASE: &str = "PROXYCHECK_API_BASE";
const ENV_DASHBOARD_BASE: &str = "PROXYCHECK_DASHBOARD_BASE";
const ENV_TIMEOUT_SECS: &str = "PROXYCHECK_TIMEOUT_SECS";

/// Configuration for a [`crate::ProxyCheckClient`].
///
/// The API key is stored verbatim. Apart from rejecting an empty key, no
/// format checks are made; a bad key is reported by the service itself.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    api_base: Url,
    dashboard_base: Url,
    timeout: Option<Duration>,
    user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration with default endpoints and no timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyCheckError::MissingApiKey`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ProxyCheckError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            api_base: parse_base(DEFAULT_API_BASE)?,
            dashboard_base: parse_base(DEFAULT_DASHBOARD_BASE)?,
            timeout: None,
            user_agent: format!("proxycheck-rs/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Creates a configuration from environment variables.
    ///
    /// `PROXYCHECK_API_KEY` is required. `PROXYCHECK_API_BASE`,
    /// `PROXYCHECK_DASHBOARD_BASE` and `PROXYCHECK_TIMEOUT_SECS` are optional
    /// overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY).ok_or(ProxyCheckError::MissingApiKey)?;
        let mut config = Self::new(api_key)?;

        if let Some(base) = lookup(ENV_API_BASE) {
            config = config.with_api_base(&base)?;
        }
        if let Some(base) = lookup(ENV_DASHBOARD_BASE) {
            config = config.with_dashboard_base(&base)?;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ProxyCheckError::InvalidConfig(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{secs}'"
                ))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Overrides the detection API base URL.
    pub fn with_api_base(mut self, base: &str) -> Result<Self> {
        self.api_base = parse_base(base)?;
        Ok(self)
    }

    /// Overrides the dashboard export base URL.
    pub fn with_dashboard_base(mut self, base: &str) -> Result<Self> {
        self.dashboard_base = parse_base(base)?;
        Ok(self)
    }

    /// Sets a whole-request timeout on the underlying HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The API key, exactly as supplied.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base URL of the detection API.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Base URL of the dashboard export API.
    pub fn dashboard_base(&self) -> &Url {
        &self.dashboard_base
    }

    /// Whole-request timeout, if one was set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Value sent as `User-Agent`.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base.as_str())
            .field("dashboard_base", &self.dashboard_base.as_str())
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Parses a base URL and makes sure its path ends in `/`.
fn parse_base(raw: &str) -> Result<Url> {
    let invalid = |reason: String| ProxyCheckError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry path segments".into()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn new_uses_defaults() {
        let config = ClientConfig::new("abc123").unwrap();
        assert_eq!(config.api_key(), "abc123");
        assert_eq!(config.api_base().as_str(), DEFAULT_API_BASE);
        assert_eq!(config.dashboard_base().as_str(), DEFAULT_DASHBOARD_BASE);
        assert!(config.timeout().is_none());
        assert!(config.user_agent().starts_with("proxycheck-rs/"));
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            ClientConfig::new(""),
            Err(ProxyCheckError::MissingApiKey)
        ));
    }

    #[test]
    fn whitespace_key_is_accepted() {
        let config = ClientConfig::new("   ").unwrap();
        assert_eq!(config.api_key(), "   ");
    }

    #[test]
    fn key_is_stored_verbatim() {
        let config = ClientConfig::new(" not-validated ").unwrap();
        assert_eq!(config.api_key(), " not-validated ");
    }

    #[test]
    fn base_gets_trailing_slash() {
        let config = ClientConfig::new("k")
            .unwrap()
            .with_api_base("http://127.0.0.1:8080/v2")
            .unwrap();
        assert_eq!(config.api_base().as_str(), "http://127.0.0.1:8080/v2/");
    }

    #[test]
    fn base_drops_query_and_fragment() {
        let config = ClientConfig::new("k")
            .unwrap()
            .with_dashboard_base("http://localhost/export/?x=1#top")
            .unwrap();
        assert_eq!(config.dashboard_base().as_str(), "http://localhost/export/");
    }

    #[test]
    fn invalid_base_is_rejected() {
        let err = ClientConfig::new("k")
            .unwrap()
            .with_api_base("not a url")
            .unwrap_err();
        assert!(matches!(err, ProxyCheckError::InvalidBaseUrl { .. }));

        let err = ClientConfig::new("k")
            .unwrap()
            .with_api_base("mailto:someone@example.com")
            .unwrap_err();
        assert!(matches!(err, ProxyCheckError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn from_lookup_requires_key() {
        let result = ClientConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ProxyCheckError::MissingApiKey)));
    }

    #[test]
    fn from_lookup_applies_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("PROXYCHECK_API_KEY", "envkey"),
            ("PROXYCHECK_API_BASE", "http://localhost:9000/v2/"),
            ("PROXYCHECK_DASHBOARD_BASE", "http://localhost:9000/dashboard/export"),
            ("PROXYCHECK_TIMEOUT_SECS", " 15 "),
        ]))
        .unwrap();

        assert_eq!(config.api_key(), "envkey");
        assert_eq!(config.api_base().as_str(), "http://localhost:9000/v2/");
        assert_eq!(
            config.dashboard_base().as_str(),
            "http://localhost:9000/dashboard/export/"
        );
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn from_lookup_rejects_bad_timeout() {
        let result = ClientConfig::from_lookup(lookup_from(&[
            ("PROXYCHECK_API_KEY", "envkey"),
            ("PROXYCHECK_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(ProxyCheckError::InvalidConfig(_))));
    }

    #[test]
    fn debug_redacts_key() {
        let config = ClientConfig::new("super-secret").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
