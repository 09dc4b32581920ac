//! cli::commands::serve
//!
//! Run the bot against the configured transport until shutdown.
//!
//! # Example
//!
//! ```bash
//! KB_TEAMNAME=acme teamkv serve
//! teamkv serve --store file --store-path ./store.json
//! ```

use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::info;

use super::{open_store, runtime, Context};
use crate::bot::{Dispatcher, Exit, Service};
use crate::core::config::Config;
use crate::transport::{self, ChannelId};
use crate::ui::output;

/// Run the serve command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn serve(
    ctx: &Context,
    store: Option<&str>,
    store_path: Option<&Path>,
    transport: Option<&str>,
) -> Result<()> {
    let config = ctx.load_config()?;
    runtime()?.block_on(serve_async(ctx, &config, store, store_path, transport))
}

async fn serve_async(
    ctx: &Context,
    config: &Config,
    store: Option<&str>,
    store_path: Option<&Path>,
    transport_provider: Option<&str>,
) -> Result<()> {
    let store = open_store(config, store, store_path)?;

    let provider = transport_provider.unwrap_or_else(|| config.transport_provider());
    let session = transport::create_transport(provider, &config.credentials())
        .with_context(|| format!("failed to open '{}' transport", provider))?;

    let channel = ChannelId::team_channel(config.team(), config.channel());
    let service = Service::new(session, Dispatcher::new(store, config.team()), channel);
    info!(team = config.team(), username = config.username(), "Initialized runner");

    match service.run().await.context("bot stopped unexpectedly")? {
        Exit::Shutdown { requested_by } => {
            output::print(format!("Shut down by {}.", requested_by), ctx.verbosity)
        }
        Exit::StreamEnded => output::print("Input ended, bot stopped.", ctx.verbosity),
    }
    Ok(())
}
