//! Push: write every stored value of one entity back to its source file.
//!
//! Runs the stored values through a short-lived `Tuner` so that the push
//! follows the same sequential, stop-at-first-failure save path as a live
//! session.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;
use tangent_core::{
    Configuration, EntityId, Registration, SaveOutcome, SourceEntity, TangentValue, Tuner,
};

use crate::cli::{GlobalOpts, PushArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct PendingValue {
    key: String,
    value: TangentValue,
}

#[derive(Tabled)]
struct PendingRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub async fn handle(args: PushArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let id = EntityId::from(args.id);
    let stored = config::value_store(cfg)
        .get(&id)
        .ok_or_else(|| util::entity_not_found(&id))?;
    let color = output::should_color(global.color);

    if args.dry_run {
        let pending: Vec<PendingValue> = stored
            .into_iter()
            .map(|(key, value)| PendingValue { key, value })
            .collect();
        let out = output::render_list(
            global.output,
            &pending,
            |p| PendingRow {
                key: p.key.clone(),
                value: p.value.to_string(),
            },
            |p| format!("{}={}", p.key, p.value),
        )?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let tuner = Tuner::new(cfg.to_tuner_config()?, config::storage(cfg));
    let entity = SourceEntity::new(id.clone(), cfg.save_client()?).with_file_path(&args.file);
    // Nothing declared: every stored key shows up as an unsaved change.
    tuner.register(Registration::new(
        id.clone(),
        Configuration::new(),
        Arc::new(entity),
    ));
    for (key, value) in stored {
        tuner.update_value_untracked(&id, &key, value);
    }

    match tuner.save_section(&id).await? {
        SaveOutcome::Saved { count } => {
            if !global.quiet {
                let message = format!("Pushed {count} values of {id} to {}", args.file);
                eprintln!("{}", output::success(&message, color));
            }
        }
        SaveOutcome::NothingToSave | SaveOutcome::AlreadySaving => {
            if !global.quiet {
                eprintln!("{}", output::muted("Nothing to push", color));
            }
        }
    }
    Ok(())
}
