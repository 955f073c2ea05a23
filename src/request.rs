//! Request construction.
//!
//! Every public client operation is described by a [`PreparedRequest`]
//! before anything touches the network. Building one is pure, so two calls
//! with the same inputs produce byte-identical URLs and bodies.

use reqwest::Method;
use url::form_urlencoded;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ProxyCheckError, Result};
use crate::models::{CheckOptions, CheckTarget, DetectionsQuery};

const USAGE_PATH: &str = "usage/";
const QUERIES_PATH: &str = "queries/";
const DETECTIONS_PATH: &str = "detections/";

/// Content type of the batch check body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully built HTTP call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Short operation name used in logs.
    pub operation: &'static str,
    pub method: Method,
    pub url: Url,
    /// Form-encoded body; only batch checks carry one.
    pub form: Option<String>,
}

impl PreparedRequest {
    fn get(operation: &'static str, url: Url) -> Self {
        Self {
            operation,
            method: Method::GET,
            url,
            form: None,
        }
    }

    /// The URL with the `key` parameter masked, for logging.
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "key" {
                    "<redacted>".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), v)
            })
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        url.to_string()
    }
}

/// Builds the detection request for one address or a batch.
///
/// A single address is placed in the path and sent with GET. A batch is
/// sent with POST to the bare endpoint, with the addresses comma-joined in
/// an `ips` form field.
pub fn check_request(
    config: &ClientConfig,
    target: &CheckTarget,
    options: &CheckOptions,
) -> Result<PreparedRequest> {
    let mut url = config.api_base().clone();

    let (method, form) = match target {
        CheckTarget::Single(ip) => {
            url.path_segments_mut()
                .map_err(|_| ProxyCheckError::InvalidBaseUrl {
                    url: config.api_base().to_string(),
                    reason: "URL cannot carry path segments".into(),
                })?
                .pop_if_empty()
                .push(ip);
            (Method::GET, None)
        }
        CheckTarget::Batch(ips) => {
            let body = form_urlencoded::Serializer::new(String::new())
                .append_pair("ips", &ips.join(","))
                .finish();
            (Method::POST, Some(body))
        }
    };

    url.query_pairs_mut()
        .extend_pairs(check_params(config.api_key(), options));

    Ok(PreparedRequest {
        operation: "check",
        method,
        url,
        form,
    })
}

/// Query parameters for a check, in wire order.
///
/// Unset boolean flags are omitted. `inf` and `risk` are always present.
/// `days` is sent only when non-zero and `tag` only when non-empty.
pub fn check_params(api_key: &str, options: &CheckOptions) -> Vec<(&'static str, String)> {
    let mut params = vec![("key", api_key.to_string())];
    push_flag(&mut params, "vpn", options.vpn);
    push_flag(&mut params, "asn", options.asn);
    push_flag(&mut params, "node", options.node);
    push_flag(&mut params, "time", options.time);

    let inf = if options.inference_enabled() { "1" } else { "0" };
    params.push(("inf", inf.to_string()));
    params.push(("risk", options.risk_level().to_string()));

    push_flag(&mut params, "port", options.port);
    push_flag(&mut params, "seen", options.seen);
    if let Some(days) = options.days.filter(|d| *d > 0) {
        params.push(("days", days.to_string()));
    }
    if let Some(tag) = options.tag.as_deref().filter(|t| !t.is_empty()) {
        params.push(("tag", tag.to_string()));
    }
    params
}

fn push_flag(params: &mut Vec<(&'static str, String)>, name: &'static str, enabled: bool) {
    if enabled {
        params.push((name, "1".to_string()));
    }
}

/// `GET <dashboard>/usage/?key=..`
pub fn usage_request(config: &ClientConfig) -> Result<PreparedRequest> {
    let mut url = dashboard_url(config, USAGE_PATH)?;
    url.query_pairs_mut().append_pair("key", config.api_key());
    Ok(PreparedRequest::get("usage", url))
}

/// `GET <dashboard>/queries/?key=..&json=1`
pub fn queries_request(config: &ClientConfig) -> Result<PreparedRequest> {
    let mut url = dashboard_url(config, QUERIES_PATH)?;
    url.query_pairs_mut()
        .append_pair("key", config.api_key())
        .append_pair("json", "1");
    Ok(PreparedRequest::get("queries", url))
}

/// `GET <dashboard>/detections/?key=..&json=1&limit=..&offset=..`
pub fn detections_request(
    config: &ClientConfig,
    query: &DetectionsQuery,
) -> Result<PreparedRequest> {
    let mut url = dashboard_url(config, DETECTIONS_PATH)?;
    url.query_pairs_mut()
        .append_pair("key", config.api_key())
        .append_pair("json", "1")
        .append_pair("limit", &query.limit.to_string())
        .append_pair("offset", &query.offset.to_string());
    Ok(PreparedRequest::get("detections", url))
}

fn dashboard_url(config: &ClientConfig, path: &str) -> Result<Url> {
    config
        .dashboard_base()
        .join(path)
        .map_err(|e| ProxyCheckError::InvalidBaseUrl {
            url: config.dashboard_base().to_string(),
            reason: e.to_string(),
        })
}
