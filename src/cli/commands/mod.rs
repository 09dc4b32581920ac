//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Async Commands
//!
//! Storage and transport calls are async. Handlers are synchronous wrappers
//! that build a current-thread tokio runtime and block on the async body, so
//! the service loop runs on a single thread.

mod completion;
mod exec;
mod serve;

pub use completion::completion;
pub use exec::exec;
pub use serve::serve;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::debug;

use super::args::Command;
use crate::core::config::Config;
use crate::store::{self, KvStore};
use crate::ui::output::Verbosity;

/// Settings shared by every command, taken from global flags.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit `--config` path.
    pub config_path: Option<PathBuf>,
    pub verbosity: Verbosity,
}

impl Context {
    /// Load configuration honoring `--config`.
    pub fn load_config(&self) -> Result<Config> {
        let loaded =
            Config::load(self.config_path.as_deref()).context("failed to load configuration")?;
        match &loaded.loaded_from {
            Some(path) => debug!(path = %path.display(), "loaded config file"),
            None => debug!("no config file, using environment and defaults"),
        }
        Ok(loaded.config)
    }
}

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Serve {
            store,
            store_path,
            transport,
        } => serve(
            ctx,
            store.as_deref(),
            store_path.as_deref(),
            transport.as_deref(),
        ),
        Command::Exec {
            message,
            sender,
            store,
            store_path,
        } => exec(
            ctx,
            &message,
            sender.as_deref(),
            store.as_deref(),
            store_path.as_deref(),
        ),
        Command::Completion { shell } => completion(shell),
    }
}

/// Build a single-threaded runtime for a command.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

/// Open the store, letting command-line flags override the config file.
fn open_store(
    config: &Config,
    provider: Option<&str>,
    path: Option<&Path>,
) -> Result<Box<dyn KvStore>> {
    let provider = provider.unwrap_or_else(|| config.store_provider());
    let path = path.or_else(|| config.store_path());
    let store = store::create_store(provider, path)
        .with_context(|| format!("failed to open '{}' store", provider))?;
    debug!(store = store.name(), "store opened");
    Ok(store)
}
