//! API command handlers.

use anyhow::{Context, Result};
use climate_core::{Config, GatewayError, RequestGateway};

pub fn url(config: &Config, path: &str) -> Result<()> {
    let gateway = RequestGateway::from_config(config)?;
    println!("{}", gateway.build_url(path));
    Ok(())
}

pub async fn get(config: &Config, path: &str) -> Result<()> {
    let gateway = RequestGateway::from_config(config)?;
    let response = gateway.get(path).await.map_err(with_hint)?;
    let body = response.text().await.context("read response body")?;
    println!("{body}");
    Ok(())
}

/// Points timeouts at the config knob that controls them.
fn with_hint(err: GatewayError) -> anyhow::Error {
    if err.is_timeout() {
        anyhow::Error::new(err)
            .context("request timed out (raise request_timeout_secs in config.toml)")
    } else {
        err.into()
    }
}
