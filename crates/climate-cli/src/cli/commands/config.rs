//! Config command handlers.

use anyhow::{Context, Result};
use climate_core::config;

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

/// Prints the configuration after env overrides, with secrets masked.
pub fn show() -> Result<()> {
    let loaded = config::Config::load().context("load config")?;
    let effective = config::Config {
        api_base_url: Some(loaded.effective_api_base_url()?),
        mapbox_access_token: loaded
            .effective_mapbox_access_token()
            .map(|_| "********".to_string()),
        ..loaded
    };
    let toml = toml::to_string(&effective).context("serialize config")?;
    print!("{toml}");
    Ok(())
}
