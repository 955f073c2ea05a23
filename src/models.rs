//! Request option types and helpers for inspecting responses.

use std::fmt;
use std::net::IpAddr;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Usage figures returned by [`crate::ProxyCheckClient::get_usage`], after
/// key normalization.
pub type UsageRecord = Map<String, Value>;

/// How much risk information the service should include.
///
/// Leaving [`CheckOptions::risk`] unset sends `risk=0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RiskLevel {
    /// `risk=1`: a 0-100 risk score.
    Score = 1,
    /// `risk=2`: the score plus the attack history of the address.
    ScoreAndAttackHistory = 2,
}

impl From<RiskLevel> for u8 {
    fn from(level: RiskLevel) -> Self {
        level as u8
    }
}

impl TryFrom<u8> for RiskLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Score),
            2 => Ok(Self::ScoreAndAttackHistory),
            other => Err(format!("risk level must be 1 or 2, got {other}")),
        }
    }
}

/// Reads `risk` as `false`, `0`, `null`, `1` or `2`. The first three mean
/// disabled.
fn deserialize_risk<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRisk {
        Flag(bool),
        Level(u64),
    }

    match Option::<RawRisk>::deserialize(deserializer)? {
        None | Some(RawRisk::Flag(false)) | Some(RawRisk::Level(0)) => Ok(None),
        Some(RawRisk::Level(level)) => u8::try_from(level)
            .map_err(|_| format!("risk level must be 1 or 2, got {level}"))
            .and_then(RiskLevel::try_from)
            .map(Some)
            .map_err(de::Error::custom),
        Some(RawRisk::Flag(true)) => Err(de::Error::custom(
            "risk must be false, 0, 1 or 2, got true",
        )),
    }
}

/// Flags accepted by [`crate::ProxyCheckClient::check`].
///
/// Boolean flags are sent as `name=1` only when set. `inf` and `risk` are
/// always sent: `inf` defaults to enabled and `risk` to `0`.
///
/// ```
/// use proxycheck::{CheckOptions, RiskLevel};
///
/// let options = CheckOptions::new()
///     .vpn()
///     .asn()
///     .risk(RiskLevel::Score)
///     .days(3)
///     .tag("signup");
/// assert!(options.vpn);
/// assert_eq!(options.days, Some(3));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Run VPN detection.
    pub vpn: bool,
    /// Include ASN, provider and geolocation data.
    pub asn: bool,
    /// Include the id of the cluster node that answered.
    pub node: bool,
    /// Include server-side processing time.
    pub time: bool,
    /// Real-time inference engine. `None` means enabled.
    pub inf: Option<bool>,
    /// Risk score verbosity. `None` sends `risk=0`.
    #[serde(deserialize_with = "deserialize_risk")]
    pub risk: Option<RiskLevel>,
    /// Include the port a proxy was seen on.
    pub port: bool,
    /// Include when the address was last seen acting as a proxy.
    pub seen: bool,
    /// Lookback window in days. The service assumes 7 when this is omitted.
    pub days: Option<u32>,
    /// Free-form tag recorded against the query in the dashboard.
    pub tag: Option<String>,
}

impl CheckOptions {
    /// All flags off; `inf` and `risk` at their defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests VPN detection.
    pub fn vpn(mut self) -> Self {
        self.vpn = true;
        self
    }

    /// Requests ASN and geolocation data.
    pub fn asn(mut self) -> Self {
        self.asn = true;
        self
    }

    /// Requests the id of the answering node.
    pub fn node(mut self) -> Self {
        self.node = true;
        self
    }

    /// Requests the server-side processing time.
    pub fn time(mut self) -> Self {
        self.time = true;
        self
    }

    /// Requests the port the proxy was seen on.
    pub fn port(mut self) -> Self {
        self.port = true;
        self
    }

    /// Requests the last-seen timestamp.
    pub fn seen(mut self) -> Self {
        self.seen = true;
        self
    }

    /// Explicitly enables or disables the inference engine.
    pub fn inference(mut self, enabled: bool) -> Self {
        self.inf = Some(enabled);
        self
    }

    /// Sets the risk score verbosity.
    pub fn risk(mut self, level: RiskLevel) -> Self {
        self.risk = Some(level);
        self
    }

    /// Sets the lookback window in days.
    pub fn days(mut self, days: u32) -> Self {
        self.days = Some(days);
        self
    }

    /// Attaches a tag to the query.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Whether the inference engine is requested (`inf=1`).
    pub fn inference_enabled(&self) -> bool {
        self.inf.unwrap_or(true)
    }

    /// The numeric risk level sent to the service.
    pub fn risk_level(&self) -> u8 {
        self.risk.map(u8::from).unwrap_or(0)
    }
}

/// One address or a batch of addresses to check.
///
/// A single address is sent as a GET with the address in the path. A batch
/// is sent as a POST with the addresses in the form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckTarget {
    Single(String),
    Batch(Vec<String>),
}

impl CheckTarget {
    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }
}

impl From<&str> for CheckTarget {
    fn from(ip: &str) -> Self {
        Self::Single(ip.to_string())
    }
}

impl From<String> for CheckTarget {
    fn from(ip: String) -> Self {
        Self::Single(ip)
    }
}

impl From<IpAddr> for CheckTarget {
    fn from(ip: IpAddr) -> Self {
        Self::Single(ip.to_string())
    }
}

impl From<Vec<String>> for CheckTarget {
    fn from(ips: Vec<String>) -> Self {
        Self::Batch(ips)
    }
}

impl From<Vec<&str>> for CheckTarget {
    fn from(ips: Vec<&str>) -> Self {
        Self::Batch(ips.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for CheckTarget {
    fn from(ips: &[&str]) -> Self {
        Self::Batch(ips.iter().map(|ip| ip.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CheckTarget {
    fn from(ips: [&str; N]) -> Self {
        Self::Batch(ips.iter().map(|ip| ip.to_string()).collect())
    }
}

impl From<Vec<IpAddr>> for CheckTarget {
    fn from(ips: Vec<IpAddr>) -> Self {
        Self::Batch(ips.iter().map(IpAddr::to_string).collect())
    }
}

/// Paging for [`crate::ProxyCheckClient::get_detections`].
///
/// Values are forwarded unchecked, negative ones included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionsQuery {
    pub limit: i64,
    pub offset: i64,
}

impl Default for DetectionsQuery {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
        }
    }
}

impl DetectionsQuery {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }
}

/// The `status` field the service puts in every response body.
///
/// HTTP status codes are not inspected by the client, so this is how a
/// caller tells a remote error apart from a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiStatus {
    Ok,
    Warning,
    Denied,
    Error,
    /// A status string this crate does not recognize.
    Unknown(String),
    /// The body had no string `status` field.
    Missing,
}

impl ApiStatus {
    pub fn of(response: &Value) -> Self {
        match response.get("status").and_then(Value::as_str) {
            Some("ok") => Self::Ok,
            Some("warning") => Self::Warning,
            Some("denied") => Self::Denied,
            Some("error") => Self::Error,
            Some(other) => Self::Unknown(other.to_string()),
            None => Self::Missing,
        }
    }

    /// `ok` and `warning` both carry usable results.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::Warning)
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Warning => f.write_str("warning"),
            Self::Denied => f.write_str("denied"),
            Self::Error => f.write_str("error"),
            Self::Unknown(s) => f.write_str(s),
            Self::Missing => f.write_str("<missing>"),
        }
    }
}
