//! Async client for the [proxycheck.io](https://proxycheck.io) proxy and
//! VPN detection API.
//!
//! The crate wraps four calls: [`ProxyCheckClient::check`] for one address
//! or a batch, and three dashboard exports ([`ProxyCheckClient::get_usage`],
//! [`ProxyCheckClient::get_queries`], [`ProxyCheckClient::get_detections`]).
//! Responses are returned as `serde_json::Value`; only the usage export is
//! reshaped (see [`normalize`]).

mod client;
mod config;
mod error;
mod models;
pub mod normalize;
pub mod request;

pub use client::ProxyCheckClient;
pub use config::{ClientConfig, DEFAULT_API_BASE, DEFAULT_DASHBOARD_BASE};
pub use error::{ProxyCheckError, Result};
pub use models::{ApiStatus, CheckOptions, CheckTarget, DetectionsQuery, RiskLevel, UsageRecord};
