//! Keyboard shortcut listing.

use serde::Serialize;
use tabled::Tabled;
use tangent_core::{Action, KeyChord, Platform};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Binding {
    action: Action,
    chord: KeyChord,
}

#[derive(Tabled)]
struct BindingRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Chord")]
    chord: String,
    #[tabled(rename = "Keys")]
    label: String,
}

pub fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let keymap = cfg.keymap()?;
    let platform = Platform::current();

    let bindings: Vec<Binding> = keymap
        .bindings()
        .iter()
        .map(|&(chord, action)| Binding { action, chord })
        .collect();

    let out = output::render_list(
        global.output,
        &bindings,
        |b| BindingRow {
            action: b.action.to_string(),
            chord: b.chord.to_string(),
            label: b.chord.label(platform),
        },
        |b| format!("{}\t{}", b.action, b.chord),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
