//! Credential resolution
//!
//! A non-empty token selects the paid flow regardless of anything else;
//! otherwise a complete username/password pair selects the free flow.

use crate::{
    Result,
    config::UPLOADER_CONFIG_KEY,
    host::ConfigStore,
    types::UploaderConfig,
};
use tracing::debug;

/// Credentials for one upload invocation
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Paid account API token
    Paid { token: String },
    /// Free account login
    Free { username: String, password: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Paid { .. } => f.write_str("Credentials::Paid"),
            Credentials::Free { username, .. } => {
                write!(f, "Credentials::Free {{ username: {:?} }}", username)
            }
        }
    }
}

impl Credentials {
    /// Short tier name for logs
    pub fn tier(&self) -> &'static str {
        match self {
            Credentials::Paid { .. } => "paid",
            Credentials::Free { .. } => "free",
        }
    }
}

/// Pick the upload flow for a stored configuration
pub fn resolve_credentials(config: &UploaderConfig) -> Result<Credentials> {
    if let Some(token) = config.token() {
        return Ok(Credentials::Paid {
            token: token.to_string(),
        });
    }

    match (config.username(), config.password()) {
        (Some(username), Some(password)) => Ok(Credentials::Free {
            username: username.to_string(),
            password: password.to_string(),
        }),
        _ => Err(crate::Error::InsufficientCredentials),
    }
}

/// Read the uploader configuration, saving an empty default when the host
/// has nothing stored yet
pub fn load_uploader_config(store: &dyn ConfigStore) -> Result<UploaderConfig> {
    match store.get_config(UPLOADER_CONFIG_KEY)? {
        Some(value) if !value.is_null() => Ok(serde_json::from_value(value)?),
        _ => {
            debug!("No uploader configuration stored, initializing defaults");
            let config = UploaderConfig::empty();
            store.save_config(UPLOADER_CONFIG_KEY, serde_json::to_value(&config)?)?;
            Ok(config)
        }
    }
}
