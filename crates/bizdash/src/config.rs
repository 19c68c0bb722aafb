//! CLI-side profile resolution: `GlobalOpts` overrides layered on top of
//! the shared `bizdash-config` profiles.
//!
//! Core never sees these types -- it receives a pre-built `BackendConfig`.

use std::time::Duration;

use bizdash_api::TlsMode;
use bizdash_config::{Config, Profile};
use bizdash_core::BackendConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use bizdash_config::{
    FileVault, config_path, load_config_or_default, resolve_credentials, resolve_username,
    save_config, store_password,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// The active profile, or an unsaved default one when none is configured.
///
/// An explicitly requested `--profile` must exist.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    match config.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None if global.profile.is_some() => Err(profile_not_found(name, config)),
        None => Ok((name, Profile::default())),
    }
}

pub fn profile_not_found(name: String, config: &Config) -> CliError {
    let available: Vec<_> = config.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Translate a profile + global flags into a `BackendConfig`.
///
/// This is the single boundary where CLI config types cross into core types.
pub fn resolve_backend(
    profile: &Profile,
    config: &Config,
    global: &GlobalOpts,
) -> Result<BackendConfig, CliError> {
    // 1. Profile + file defaults
    let mut backend = bizdash_config::profile_to_backend_config(profile, &config.defaults)
        .map_err(|e| match e {
            bizdash_config::ConfigError::Validation { field, reason } => {
                CliError::Validation { field, reason }
            }
            other => other.into(),
        })?;

    // 2. API URL (flag > env > profile)
    if let Some(ref url_str) = global.api_url {
        backend.url = url_str.parse().map_err(|_| CliError::Validation {
            field: "api-url".into(),
            reason: format!("invalid URL: {url_str}"),
        })?;
    }

    // 3. TLS
    if global.insecure {
        backend.tls = TlsMode::DangerAcceptInvalid;
    }

    // 4. Timeout
    if let Some(secs) = global.timeout {
        backend.timeout = Duration::from_secs(secs);
    }

    Ok(backend)
}
