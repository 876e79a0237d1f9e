//! Config command handlers.

use anyhow::{Context, Result};
use fitsession_core::config;

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

pub fn generate() -> Result<()> {
    let toml = config::Config::generate()?;
    print!("{toml}");
    Ok(())
}

pub fn set_api_key(key: &str) -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::save_api_key_to(&config_path, key)
        .with_context(|| format!("save API key to {}", config_path.display()))?;
    println!("API key saved to: {}", config_path.display());
    Ok(())
}
