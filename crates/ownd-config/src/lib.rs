//! Configuration for the ownd tools.
//!
//! TOML gateway profiles, credential resolution (env + keyring + plaintext)
//! and translation to `ownd_api::GatewayEndpoint` / `RetryPolicy`. The CLI
//! layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use ownd_api::endpoint::DEFAULT_PORT;
use ownd_api::{Backoff, GatewayEndpoint, RetryPolicy};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keyring service name for stored gateway passwords.
pub const KEYRING_SERVICE: &str = "ownd";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named gateway profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The named profile, or the default one.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// `text` or `json`.
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            retry: RetrySettings::default(),
        }
    }
}

fn default_output() -> String {
    "text".into()
}

/// Reconnect tuning; see [`RetryPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub time_unit_ms: u64,
    pub reset_delay_units: u32,
    pub handshake_timeout_units: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            time_unit_ms: u64::try_from(policy.time_unit.as_millis()).unwrap_or(1000),
            reset_delay_units: policy.reset_delay_units,
            handshake_timeout_units: policy.handshake_timeout_units,
        }
    }
}

impl RetrySettings {
    pub fn to_policy(&self) -> Result<RetryPolicy, ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Validation {
                field: "retry.max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.time_unit_ms == 0 {
            return Err(ConfigError::Validation {
                field: "retry.time_unit_ms".into(),
                reason: "must be positive".into(),
            });
        }
        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Backoff::Linear,
            time_unit: Duration::from_millis(self.time_unit_ms),
            reset_delay_units: self.reset_delay_units,
            handshake_timeout_units: self.handshake_timeout_units,
        })
    }
}

/// A named gateway profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Host name or IP address of the gateway.
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    pub serial: Option<String>,
    pub model: Option<String>,
    pub firmware: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Profile {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: DEFAULT_PORT,
            password: None,
            password_env: None,
            serial: None,
            model: None,
            firmware: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "ownd", "ownd").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ownd");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `OWND_*` variables.
/// Nested keys use a double underscore: `OWND_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OWND_").split("__"));

    let config: Config = figment.extract()?;
    tracing::debug!(path = %path.display(), profiles = config.profiles.len(), "Loaded config");
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a gateway password. `None` is valid: open gateways need none.
///
/// Order: the profile's `password_env` variable, the system keyring
/// (`ownd` / `<profile>/password`), then plaintext in the config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Some(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    profile.password.clone().map(SecretString::from)
}

/// Build a `GatewayEndpoint` from a profile, no CLI overrides.
pub fn profile_to_endpoint(
    profile: &Profile,
    profile_name: &str,
) -> Result<GatewayEndpoint, ConfigError> {
    if profile.address.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "address".into(),
            reason: format!("profile '{profile_name}' has an empty address"),
        });
    }
    if profile.port == 0 {
        return Err(ConfigError::Validation {
            field: "port".into(),
            reason: "must be between 1 and 65535".into(),
        });
    }

    Ok(GatewayEndpoint {
        address: profile.address.trim().to_owned(),
        port: profile.port,
        password: resolve_password(profile, profile_name),
        serial: profile.serial.clone(),
        model: profile.model.clone(),
        firmware: profile.firmware.clone(),
    })
}

/// All profiles as endpoints, e.g. to seed a `StaticDiscovery`.
/// Profiles that fail validation are skipped.
pub fn endpoints(config: &Config) -> Vec<GatewayEndpoint> {
    let mut names: Vec<_> = config.profiles.keys().collect();
    names.sort();
    names
        .into_iter()
        .filter_map(|name| {
            let profile = config.profiles.get(name)?;
            match profile_to_endpoint(profile, name) {
                Ok(endpoint) => Some(endpoint),
                Err(e) => {
                    tracing::warn!(profile = %name, error = %e, "Skipping invalid profile");
                    None
                }
            }
        })
        .collect()
}
