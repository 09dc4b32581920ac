//! cli::commands::exec
//!
//! Handle one message without a transport and print the reply.
//!
//! Useful for scripting and for checking a store file by hand:
//!
//! ```bash
//! teamkv exec --store file '!storage list'
//! ```

use std::path::Path;

use anyhow::Result;

use super::{open_store, runtime, Context};
use crate::bot::{Dispatcher, Outcome};
use crate::command::COMMAND_PREFIX;
use crate::core::config::Config;
use crate::ui::output;

/// Run the exec command.
///
/// # Errors
///
/// Faults that the bot would only log (unknown verb, anonymous shutdown)
/// are returned so the process exits non-zero.
pub fn exec(
    ctx: &Context,
    message: &[String],
    sender: Option<&str>,
    store: Option<&str>,
    store_path: Option<&Path>,
) -> Result<()> {
    let config = ctx.load_config()?;
    let body = message.join(" ");
    let sender = sender.unwrap_or_else(|| config.username()).to_string();

    runtime()?.block_on(exec_async(ctx, &config, &body, &sender, store, store_path))
}

async fn exec_async(
    ctx: &Context,
    config: &Config,
    body: &str,
    sender: &str,
    store: Option<&str>,
    store_path: Option<&Path>,
) -> Result<()> {
    let dispatcher = Dispatcher::new(open_store(config, store, store_path)?, config.team());
    match dispatcher.handle_text(body, sender).await? {
        Some(Outcome::Reply(text)) => output::reply(text),
        Some(Outcome::Shutdown { ack, .. }) => output::reply(ack),
        None => output::warn(
            format!(
                "not a bot command, messages must start with `{}`",
                COMMAND_PREFIX
            ),
            ctx.verbosity,
        ),
    }
    Ok(())
}
