//! Direct save: one value, one endpoint call.

use tangent_core::EntityId;
use tangent_core::convert::save_request;

use crate::cli::{GlobalOpts, SaveArgs};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(args: SaveArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let id = EntityId::from(args.id);
    let value = util::parse_value(&args.value, args.kind)?;
    let client = cfg.save_client()?;

    let request = save_request(&args.file, &id, &args.key, &value);
    tracing::debug!(endpoint = %cfg.endpoint, %id, key = %args.key, "saving");
    client
        .save(&request)
        .await
        .map_err(|e| CliError::from_api(e, &cfg.endpoint))?;

    if !global.quiet {
        let color = output::should_color(global.color);
        let message = format!("{id}.{} = {value} → {}", args.key, args.file);
        eprintln!("{}", output::success(&message, color));
    }
    Ok(())
}
