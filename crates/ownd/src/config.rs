//! Endpoint resolution: config profile plus command-line overrides.

use ownd_api::{GatewayEndpoint, RetryPolicy};
use ownd_config::{Config, ConfigError};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the config file named by `--config`, or the platform default.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let config = match global.config.as_deref() {
        Some(path) => ownd_config::load_config_from(path)?,
        None => ownd_config::load_config()?,
    };
    Ok(config)
}

/// Where the config lives for this invocation.
pub fn path(global: &GlobalOpts) -> String {
    global
        .config
        .clone()
        .unwrap_or_else(ownd_config::config_path)
        .display()
        .to_string()
}

/// Resolve the gateway to talk to.
///
/// A matching profile is the base and flags override it. Without a
/// profile, `--address` alone is enough. An explicitly named profile
/// that does not exist is an error even when `--address` is given.
pub fn resolve_endpoint(global: &GlobalOpts, config: &Config) -> Result<GatewayEndpoint, CliError> {
    let endpoint = match config.profile(global.profile.as_deref()) {
        Ok((name, profile)) => {
            tracing::debug!(profile = name, "Using gateway profile");
            let mut endpoint = ownd_config::profile_to_endpoint(profile, name)?;
            if let Some(address) = &global.address {
                endpoint.address.clone_from(address);
            }
            endpoint
        }
        Err(ConfigError::UnknownProfile { profile }) if global.profile.is_some() => {
            let mut names: Vec<_> = config.profiles.keys().map(String::as_str).collect();
            names.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        Err(ConfigError::UnknownProfile { .. }) => match &global.address {
            Some(address) => GatewayEndpoint::new(address.trim()),
            None => return Err(CliError::NoConfig { path: path(global) }),
        },
        Err(other) => return Err(other.into()),
    };

    apply_overrides(endpoint, global)
}

fn apply_overrides(mut endpoint: GatewayEndpoint, global: &GlobalOpts) -> Result<GatewayEndpoint, CliError> {
    if endpoint.address.is_empty() {
        return Err(CliError::Validation {
            field: "address".into(),
            reason: "must not be empty".into(),
        });
    }
    if let Some(port) = global.port {
        if port == 0 {
            return Err(CliError::Validation {
                field: "port".into(),
                reason: "must be between 1 and 65535".into(),
            });
        }
        endpoint = endpoint.with_port(port);
    }
    if let Some(password) = &global.password {
        endpoint = endpoint.with_password(password.as_str());
    }
    Ok(endpoint)
}

/// Reconnect tuning from the `[defaults.retry]` table.
pub fn retry_policy(config: &Config) -> Result<RetryPolicy, CliError> {
    Ok(config.defaults.retry.to_policy()?)
}
