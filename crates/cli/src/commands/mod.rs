pub mod ask;
pub mod chat;
pub mod doctor;

use gemrelay_agent::Relay;
use gemrelay_config::AppConfig;
use gemrelay_core::{Error, Result};
use gemrelay_providers::ReqwestTransport;
use std::sync::Arc;

/// Load configuration and wire a relay, failing early without credentials.
pub fn build_relay() -> Result<(AppConfig, Relay)> {
    let config =
        AppConfig::load().map_err(|e| Error::config(format!("Failed to load config: {e}")))?;

    // Fail early with setup guidance when no API key is configured
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (or put it in a .env file):");
        eprintln!("    GEMINI_API_KEY   = 'AIza...'   (recommended)");
        eprintln!("    GEMRELAY_API_KEY = 'AIza...'   (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Get a key at: https://aistudio.google.com/app/apikey");
        eprintln!();
        return Err(Error::config("No API key found. See above for setup instructions."));
    }

    let transport = Arc::new(ReqwestTransport::new()?);
    let relay = Relay::from_config(&config, transport);
    Ok((config, relay))
}
