//! Looks up the addresses given on the command line.
//!
//! ```text
//! PROXYCHECK_API_KEY=... RUST_LOG=proxycheck=debug cargo run --example lookup -- 8.8.8.8 1.1.1.1
//! ```

use anyhow::{bail, Context};
use proxycheck::{ApiStatus, CheckOptions, CheckTarget, ProxyCheckClient, RiskLevel};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut addresses: Vec<String> = std::env::args().skip(1).collect();
    let target = match addresses.len() {
        0 => bail!("usage: lookup <ip> [<ip> ...]"),
        1 => CheckTarget::from(addresses.remove(0)),
        _ => CheckTarget::from(addresses),
    };

    let client = ProxyCheckClient::from_env().context("building client")?;
    let options = CheckOptions::new().vpn().asn().risk(RiskLevel::Score);

    let result = client.check(target, &options).await?;
    match ApiStatus::of(&result) {
        status if status.is_success() => info!(%status, "lookup complete"),
        status => warn!(%status, message = ?result.get("message"), "lookup rejected"),
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    let usage = client.get_usage().await?;
    info!(usage = %usage, "account usage");
    Ok(())
}
