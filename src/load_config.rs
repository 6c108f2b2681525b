/// `load_config` module: Loads the TOML config file and environment overrides into a
/// validated [`AppConfig`].
///
/// This module is the only place where the user-supplied config file is parsed.
///
/// # Responsibilities
/// - Parse the `[API]` and `[EXPORT]` tables into typed structs
/// - Let `BRICKLINK_*` environment variables override the four credentials
/// - Reject blank credentials, a blank export path and a zero timeout before
///   anything touches the network
///
/// # Errors
/// All errors use `anyhow::Error` and name the offending key; they surface at
/// the CLI boundary.
use anyhow::{bail, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::oauth::Credentials;

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(rename = "API")]
    api: ApiSection,
    #[serde(rename = "EXPORT")]
    export: ExportSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ApiSection {
    #[serde(default)]
    consumer_key: String,
    #[serde(default)]
    consumer_secret: String,
    #[serde(default)]
    token_value: String,
    #[serde(default)]
    token_secret: String,
    #[serde(default)]
    inventories: Vec<i64>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct ExportSection {
    path: PathBuf,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub base_url: String,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub inventory_ids: Vec<i64>,
}

/// Environment variable overriding each credential key.
const CREDENTIAL_ENV: [(&str, &str); 4] = [
    ("CONSUMER_KEY", "BRICKLINK_CONSUMER_KEY"),
    ("CONSUMER_SECRET", "BRICKLINK_CONSUMER_SECRET"),
    ("TOKEN_VALUE", "BRICKLINK_TOKEN_VALUE"),
    ("TOKEN_SECRET", "BRICKLINK_TOKEN_SECRET"),
];

fn resolve_credential(key: &str, env_var: &str, from_file: String) -> Result<String> {
    let value = match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => {
            info!(key, env_var, "Credential taken from environment");
            v
        }
        _ => from_file,
    };
    if value.trim().is_empty() {
        error!(key, env_var, "Missing configuration data");
        bail!(
            "Missing configuration data: API.{key} is empty (set it in the config file or {env_var})"
        );
    }
    Ok(value)
}

/// Loads and validates the config at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            bail!("Failed to read config file {:?}: {}", path_ref, e);
        }
    };

    let raw: RawConfig = match toml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config TOML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config TOML");
            bail!("Failed to parse config TOML: {e}");
        }
    };

    let ApiSection {
        consumer_key,
        consumer_secret,
        token_value,
        token_secret,
        inventories,
        base_url,
        timeout_secs,
    } = raw.api;
    let [ck, cs, tv, ts] = CREDENTIAL_ENV;
    let credentials = Credentials {
        consumer_key: resolve_credential(ck.0, ck.1, consumer_key)?,
        consumer_secret: resolve_credential(cs.0, cs.1, consumer_secret)?,
        token_value: resolve_credential(tv.0, tv.1, token_value)?,
        token_secret: resolve_credential(ts.0, ts.1, token_secret)?,
    };

    if raw.export.path.as_os_str().is_empty() {
        error!("EXPORT.PATH is empty");
        bail!("Missing configuration data: EXPORT.PATH is empty");
    }

    let timeout = match timeout_secs {
        Some(0) => bail!("API.TIMEOUT_SECS must be greater than zero"),
        Some(secs) => Duration::from_secs(secs),
        None => DEFAULT_TIMEOUT,
    };

    let base_url = base_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

    info!(
        output_dir = %raw.export.path.display(),
        base_url = %base_url,
        inventories = inventories.len(),
        timeout_secs = timeout.as_secs(),
        "Config loaded and validated successfully"
    );

    Ok(AppConfig {
        credentials,
        base_url,
        timeout,
        output_dir: raw.export.path,
        inventory_ids: inventories,
    })
}
