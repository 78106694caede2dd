//! Value store command handlers.

use serde::Serialize;
use tabled::Tabled;
use tangent_core::{Configuration, EntityId};

use crate::cli::{GlobalOpts, OutputFormat, StoreArgs, StoreCommand};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

const SUMMARY_WIDTH: usize = 60;

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StoredEntity {
    id: EntityId,
    values: Configuration,
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    id: String,
    #[tabled(rename = "Keys")]
    keys: usize,
    #[tabled(rename = "Values")]
    summary: String,
}

impl From<&StoredEntity> for EntityRow {
    fn from(e: &StoredEntity) -> Self {
        let summary = e
            .values
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: e.id.to_string(),
            keys: e.values.len(),
            summary: util::truncate(&summary, SUMMARY_WIDTH),
        }
    }
}

#[derive(Tabled)]
struct ValueRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

fn detail(values: &Configuration) -> String {
    let rows: Vec<ValueRow> = values
        .iter()
        .map(|(k, v)| ValueRow {
            key: k.clone(),
            value: v.to_string(),
            kind: v.kind().to_string(),
        })
        .collect();
    tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string()
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: StoreArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let store = config::value_store(cfg);
    let color = output::should_color(global.color);

    match args.command {
        StoreCommand::List => {
            let entries: Vec<StoredEntity> = store
                .entities()
                .into_iter()
                .filter_map(|id| store.get(&id).map(|values| StoredEntity { id, values }))
                .collect();
            if entries.is_empty() && matches!(global.output, OutputFormat::Table) {
                if !global.quiet {
                    eprintln!("{}", output::muted("No stored values", color));
                }
                return Ok(());
            }
            let out = output::render_list(
                global.output,
                &entries,
                |e| EntityRow::from(e),
                |e| e.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StoreCommand::Get { id } => {
            let id = EntityId::from(id);
            let values = store.get(&id).ok_or_else(|| util::entity_not_found(&id))?;
            let out = output::render_single(global.output, &values, detail)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StoreCommand::Set {
            id,
            key,
            value,
            kind,
        } => {
            let id = EntityId::from(id);
            let value = util::parse_value(&value, kind)?;
            store.update(&id, &key, value.clone());
            if !global.quiet {
                eprintln!("{}", output::success(&format!("{id}.{key} = {value}"), color));
            }
            Ok(())
        }

        StoreCommand::Clear { id: Some(id) } => {
            let id = EntityId::from(id);
            if store.get(&id).is_none() {
                return Err(util::entity_not_found(&id));
            }
            store.remove(&id);
            if !global.quiet {
                eprintln!("{}", output::success(&format!("Cleared {id}"), color));
            }
            Ok(())
        }

        StoreCommand::Clear { id: None } => {
            if !global.yes {
                return Err(CliError::NonInteractiveRequiresYes {
                    action: "store clear".into(),
                });
            }
            let ids = store.entities();
            for id in &ids {
                store.remove(id);
            }
            if !global.quiet {
                eprintln!(
                    "{}",
                    output::success(&format!("Cleared {} entities", ids.len()), color)
                );
            }
            Ok(())
        }
    }
}
