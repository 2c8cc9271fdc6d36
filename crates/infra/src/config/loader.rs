//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Read a `.env` file into the environment when one exists
//! 2. Build the configuration from `CONDUIT_*` variables
//! 3. If `CONDUIT_REPO_ENDPOINT` is unset, fall back to a probed file
//! 4. JSON and TOML are both accepted, chosen by extension
//!
//! ## Environment Variables
//! - `CONDUIT_REPO_ENDPOINT`: repository root (required for env loading)
//! - `CONDUIT_FILE_ENDPOINT`: file service root
//! - `CONDUIT_AUTH_ENDPOINT`: auth service root
//! - `CONDUIT_USER_NAME` / `CONDUIT_API_KEY`: signing credentials, both or neither
//! - `CONDUIT_SESSION_TOKEN`: session token header value
//! - `CONDUIT_UPLOAD_CONCURRENCY`: parts in flight at once
//! - `CONDUIT_HTTP_TIMEOUT_MS`: per-request timeout
//!
//! ## File Locations
//! `conduit.toml` then `conduit.json`, looked up in the working directory,
//! its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use conduit_domain::{ClientConfig, ConduitError, Credentials, Result};

use crate::errors::InfraError;

const ENV_REPO_ENDPOINT: &str = "CONDUIT_REPO_ENDPOINT";
const ENV_FILE_ENDPOINT: &str = "CONDUIT_FILE_ENDPOINT";
const ENV_AUTH_ENDPOINT: &str = "CONDUIT_AUTH_ENDPOINT";
const ENV_USER_NAME: &str = "CONDUIT_USER_NAME";
const ENV_API_KEY: &str = "CONDUIT_API_KEY";
const ENV_SESSION_TOKEN: &str = "CONDUIT_SESSION_TOKEN";
const ENV_UPLOAD_CONCURRENCY: &str = "CONDUIT_UPLOAD_CONCURRENCY";
const ENV_HTTP_TIMEOUT_MS: &str = "CONDUIT_HTTP_TIMEOUT_MS";

const FILE_NAMES: [&str; 2] = ["conduit.toml", "conduit.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ConduitError::Config` when neither source yields a valid
/// configuration.
pub fn load() -> Result<ClientConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `CONDUIT_*` environment variables
///
/// Unset optional variables keep their defaults.
///
/// # Errors
/// Returns `ConduitError::Config` if `CONDUIT_REPO_ENDPOINT` is missing, a
/// number does not parse, only half of the credentials are set, or the
/// result fails validation.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::default();
    config.endpoints.repo = env_var(ENV_REPO_ENDPOINT)?;

    if let Some(file) = env_opt(ENV_FILE_ENDPOINT) {
        config.endpoints.file = file;
    }
    if let Some(auth) = env_opt(ENV_AUTH_ENDPOINT) {
        config.endpoints.auth = auth;
    }

    config.credentials = match (env_opt(ENV_USER_NAME), env_opt(ENV_API_KEY)) {
        (Some(user_name), Some(api_key)) => Some(Credentials { user_name, api_key }),
        (None, None) => None,
        _ => {
            return Err(ConduitError::Config(format!(
                "{ENV_USER_NAME} and {ENV_API_KEY} must be set together"
            )))
        }
    };
    config.session_token = env_opt(ENV_SESSION_TOKEN);

    if let Some(concurrency) = env_parse::<usize>(ENV_UPLOAD_CONCURRENCY)? {
        config.upload.concurrency = concurrency;
    }
    if let Some(timeout_ms) = env_parse::<u64>(ENV_HTTP_TIMEOUT_MS)? {
        config.http.timeout_ms = timeout_ms;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations via
/// [`probe_config_paths`].
///
/// # Errors
/// Returns `ConduitError::Config` if the file is missing, malformed, or
/// fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConduitError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConduitError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConduitError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConduitError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ConduitError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// First existing `conduit.{toml,json}` in the standard locations
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        ConduitError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Set and non-blank
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ConduitError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
