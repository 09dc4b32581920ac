//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment variables
//! 4. CLI flags (not handled here)
//!
//! # Config File Locations
//!
//! An explicit path (from `--config`) must exist. Otherwise, searched in order:
//! 1. `$TEAMKV_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/teamkv/config.toml`
//! 3. `~/.teamkv/config.toml`
//!
//! A missing file is not an error; defaults and the environment apply.
//!
//! # Environment
//!
//! - `KB_TEAMNAME` - team (required unless set in the file)
//! - `KB_CHANNEL` - channel topic (default: `general`)
//! - `KB_USERNAME` - bot username (default: `teamkv`)
//! - `KB_PAPERKEY` - bot credential; environment only, never logged
//!
//! # Example
//!
//! ```no_run
//! use teamkv::core::config::Config;
//!
//! let config = Config::load(None).unwrap().config;
//! println!("Serving {} on {}", config.team(), config.channel());
//! ```

pub mod schema;

pub use schema::{BotConfig, ConfigFile, StoreConfig, TransportConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("missing config value: {0}")]
    MissingValue(String),
}

/// Bot login credentials.
///
/// The paper key is never printed; `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    paper_key: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, paper_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            paper_key: Some(paper_key.into()),
        }
    }

    /// Credentials without a paper key, for transports that need none.
    pub fn username_only(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            paper_key: None,
        }
    }

    /// Whether a paper key was supplied.
    pub fn has_paper_key(&self) -> bool {
        self.paper_key.is_some()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("paper_key", &self.paper_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Values taken from the process environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub team: Option<String>,
    pub channel: Option<String>,
    pub username: Option<String>,
    pub paper_key: Option<String>,
}

impl EnvOverrides {
    /// Read overrides with a lookup function; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            team: get("KB_TEAMNAME"),
            channel: get("KB_CHANNEL"),
            username: get("KB_USERNAME"),
            paper_key: get("KB_PAPERKEY"),
        }
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

impl std::fmt::Debug for EnvOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvOverrides")
            .field("team", &self.team)
            .field("channel", &self.channel)
            .field("username", &self.username)
            .field("paper_key", &self.paper_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Path of the config file that was read, if any.
    pub loaded_from: Option<PathBuf>,
}

/// Merged configuration from file and environment.
///
/// Accessors apply precedence automatically. A `Config` that came out of
/// [`Config::load`] or [`Config::from_parts`] always has a team.
#[derive(Debug, Clone)]
pub struct Config {
    file: ConfigFile,
    env: EnvOverrides,
    team: String,
}

impl Config {
    /// Load configuration from the file at `path`, or the default locations,
    /// and the process environment.
    ///
    /// # Errors
    ///
    /// - An explicit `path` that cannot be read
    /// - A config file that cannot be parsed or fails validation
    /// - No team configured anywhere
    pub fn load(path: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let (file, loaded_from) = match path {
            Some(path) => (Self::read_file(path)?, Some(path.to_path_buf())),
            None => match Self::find_file(|name| std::env::var(name).ok()) {
                Some(path) => (Self::read_file(&path)?, Some(path)),
                None => (ConfigFile::default(), None),
            },
        };

        Ok(ConfigLoadResult {
            config: Self::from_parts(file, EnvOverrides::from_env())?,
            loaded_from,
        })
    }

    /// Build a config from already-read parts.
    pub fn from_parts(file: ConfigFile, env: EnvOverrides) -> Result<Self, ConfigError> {
        file.validate()?;

        let team = env
            .team
            .clone()
            .or_else(|| file.bot.as_ref().and_then(|b| b.team.clone()))
            .ok_or_else(|| {
                ConfigError::MissingValue("team (set KB_TEAMNAME or [bot].team)".into())
            })?;

        Ok(Self { file, env, team })
    }

    /// Locate the config file in the default locations.
    fn find_file(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
        if let Some(path) = lookup("TEAMKV_CONFIG").map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }

        if let Some(xdg_home) = lookup("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("teamkv/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".teamkv/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn bot(&self) -> Option<&BotConfig> {
        self.file.bot.as_ref()
    }

    /// Team whose store and channel the bot serves.
    pub fn team(&self) -> &str {
        &self.team
    }

    /// Channel topic.
    ///
    /// Defaults to "general" if not configured.
    pub fn channel(&self) -> &str {
        self.env
            .channel
            .as_deref()
            .or_else(|| self.bot().and_then(|b| b.channel.as_deref()))
            .unwrap_or("general")
    }

    /// Bot username.
    ///
    /// Defaults to "teamkv" if not configured.
    pub fn username(&self) -> &str {
        self.env
            .username
            .as_deref()
            .or_else(|| self.bot().and_then(|b| b.username.as_deref()))
            .unwrap_or("teamkv")
    }

    /// Login credentials for the transport.
    pub fn credentials(&self) -> Credentials {
        match &self.env.paper_key {
            Some(key) => Credentials::new(self.username(), key.clone()),
            None => Credentials::username_only(self.username()),
        }
    }

    /// Store provider.
    ///
    /// Defaults to "memory" if not configured.
    pub fn store_provider(&self) -> &str {
        self.file
            .store
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or(crate::store::DEFAULT_PROVIDER)
    }

    /// Store file path, if configured.
    pub fn store_path(&self) -> Option<&Path> {
        self.file.store.as_ref().and_then(|s| s.path.as_deref())
    }

    /// Transport provider.
    ///
    /// Defaults to "stdio" if not configured.
    pub fn transport_provider(&self) -> &str {
        self.file
            .transport
            .as_ref()
            .and_then(|t| t.provider.as_deref())
            .unwrap_or(crate::transport::DEFAULT_PROVIDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> EnvOverrides {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvOverrides::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_with_team_from_env() {
        let config =
            Config::from_parts(ConfigFile::default(), env(&[("KB_TEAMNAME", "acme")])).unwrap();

        assert_eq!(config.team(), "acme");
        assert_eq!(config.channel(), "general");
        assert_eq!(config.username(), "teamkv");
        assert_eq!(config.store_provider(), "memory");
        assert_eq!(config.transport_provider(), "stdio");
        assert!(config.store_path().is_none());
        assert!(!config.credentials().has_paper_key());
    }

    #[test]
    fn missing_team_rejected() {
        let err = Config::from_parts(ConfigFile::default(), EnvOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue(_)));
        assert!(err.to_string().contains("KB_TEAMNAME"));
    }

    #[test]
    fn env_overrides_file() {
        let file = ConfigFile {
            bot: Some(BotConfig {
                team: Some("file-team".into()),
                channel: Some("file-channel".into()),
                username: Some("file-bot".into()),
            }),
            ..Default::default()
        };

        let config = Config::from_parts(
            file.clone(),
            env(&[("KB_TEAMNAME", "env-team"), ("KB_CHANNEL", "env-channel")]),
        )
        .unwrap();
        assert_eq!(config.team(), "env-team");
        assert_eq!(config.channel(), "env-channel");
        assert_eq!(config.username(), "file-bot");

        let config = Config::from_parts(file, EnvOverrides::default()).unwrap();
        assert_eq!(config.team(), "file-team");
    }

    #[test]
    fn blank_env_values_are_unset() {
        let overrides = env(&[("KB_TEAMNAME", "  "), ("KB_CHANNEL", "")]);
        assert!(overrides.team.is_none());
        assert!(overrides.channel.is_none());
    }

    #[test]
    fn paper_key_redacted_in_debug() {
        let config = Config::from_parts(
            ConfigFile::default(),
            env(&[("KB_TEAMNAME", "acme"), ("KB_PAPERKEY", "correct horse battery")]),
        )
        .unwrap();

        let credentials = config.credentials();
        assert!(credentials.has_paper_key());
        assert_eq!(
            credentials,
            Credentials::new("teamkv", "correct horse battery")
        );
        assert!(!format!("{:?}", credentials).contains("horse"));
        assert!(!format!("{:?}", config).contains("horse"));
    }

    #[test]
    fn load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [bot]
            team = "acme"

            [store]
            provider = "file"
            path = "/tmp/kv.json"
            "#,
        )
        .unwrap();

        let file = Config::read_file(&path).unwrap();
        let config = Config::from_parts(file, EnvOverrides::default()).unwrap();
        assert_eq!(config.store_provider(), "file");
        assert_eq!(config.store_path(), Some(Path::new("/tmp/kv.json")));
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "unknown_field = true").unwrap();

        let result = Config::read_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_provider_rejected() {
        let file = ConfigFile {
            store: Some(StoreConfig {
                provider: Some("tape".into()),
                path: None,
            }),
            ..Default::default()
        };
        let result = Config::from_parts(file, env(&[("KB_TEAMNAME", "acme")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn find_file_prefers_explicit_env_var() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("explicit.toml");
        fs::write(&explicit, "").unwrap();
        let xdg = temp.path().join("xdg");
        fs::create_dir_all(xdg.join("teamkv")).unwrap();
        fs::write(xdg.join("teamkv/config.toml"), "").unwrap();

        let explicit_str = explicit.to_string_lossy().to_string();
        let xdg_str = xdg.to_string_lossy().to_string();
        let found = Config::find_file(|name| match name {
            "TEAMKV_CONFIG" => Some(explicit_str.clone()),
            "XDG_CONFIG_HOME" => Some(xdg_str.clone()),
            _ => None,
        });
        assert_eq!(found, Some(explicit));

        let found = Config::find_file(|name| match name {
            "XDG_CONFIG_HOME" => Some(xdg_str.clone()),
            _ => None,
        });
        assert_eq!(found, Some(xdg.join("teamkv/config.toml")));
    }
}
