mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::io::ErrorKind;
use tracing::debug;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads `.env`, the YAML config file and the API credential.
///
/// An explicit `CONFIG_PATH` must exist; the default `config.yaml` may be
/// absent, in which case built-in defaults apply. The credential is required.
pub async fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    let explicit_path = env::var("CONFIG_PATH").ok();
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    debug!("Loading configuration from: {}", config_path);

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(config_str) => parse(&config_str)?,
        Err(e) if explicit_path.is_none() && e.kind() == ErrorKind::NotFound => {
            debug!("No {} found, using defaults", config_path);
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    config.llm.api_key = resolve_api_key(env::var(API_KEY_ENV).ok())?;

    Ok(config)
}

pub fn parse(config_str: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(config_str)?)
}

pub fn resolve_api_key(value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(Error::config(format!(
            "{API_KEY_ENV} must be set in the environment or .env file"
        ))),
    }
}
