//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);

    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let storage = cfg.storage_path();
            let out = output::render_single(global.output, &cfg, |c| {
                let body = toml::to_string_pretty(c).unwrap_or_default();
                format!("{body}\n# value store: {}", storage.display())
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let written = config::save_config(&Config::default())?;
            if !global.quiet {
                eprintln!(
                    "{}",
                    output::success(&format!("Wrote {}", written.display()), color)
                );
            }
            Ok(())
        }
    }
}
