//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod keys;
pub mod push;
pub mod save;
pub mod store;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a config-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Store(args) => store::handle(args, cfg, global),
        Command::Save(args) => save::handle(args, cfg, global).await,
        Command::Push(args) => push::handle(args, cfg, global).await,
        Command::Keys => keys::handle(cfg, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
