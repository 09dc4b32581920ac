//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Validation
//!
//! Values are validated after parsing: provider names must be known and
//! names that end up in chat addresses must not be blank.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// [bot]
/// team = "acme"
/// channel = "general"
/// username = "kvbot"
///
/// [store]
/// provider = "file"
/// path = "/var/lib/teamkv/store.json"
///
/// [transport]
/// provider = "stdio"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Chat identity and channel
    pub bot: Option<BotConfig>,

    /// Storage backend selection
    pub store: Option<StoreConfig>,

    /// Chat transport selection
    pub transport: Option<TransportConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bot) = &self.bot {
            bot.validate()?;
        }
        if let Some(store) = &self.store {
            store.validate()?;
        }
        if let Some(transport) = &self.transport {
            transport.validate()?;
        }
        Ok(())
    }
}

/// `[bot]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Team whose store and channel the bot serves
    pub team: Option<String>,

    /// Channel (topic) name within the team (default: "general")
    pub channel: Option<String>,

    /// Bot username
    pub username: Option<String>,
}

impl BotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("bot.team", &self.team),
            ("bot.channel", &self.channel),
            ("bot.username", &self.username),
        ] {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidValue(format!("{} cannot be blank", name)));
                }
            }
        }
        Ok(())
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Store provider: "memory" (default) or "file"
    pub provider: Option<String>,

    /// Store file path for the "file" provider
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            let valid = crate::store::valid_store_names();
            if !valid.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid store provider '{}', must be one of: {}",
                    provider,
                    valid.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// `[transport]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    /// Transport provider (default: "stdio")
    pub provider: Option<String>,
}

impl TransportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            let valid = crate::transport::valid_transport_names();
            if !valid.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid transport provider '{}', must be one of: {}",
                    provider,
                    valid.join(", ")
                )));
            }
        }
        Ok(())
    }
}
