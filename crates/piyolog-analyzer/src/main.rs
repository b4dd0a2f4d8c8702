mod bootstrap;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use piyolog_core::settings::Settings;
use piyolog_data::analysis::analyze_tabs;
use piyolog_data::projection::AlphaScale;
use piyolog_data::reader::{load_tabs, STDIN_PATH};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;
    settings.validate()?;

    tracing::info!("piyolog-analyzer v{} starting", env!("CARGO_PKG_VERSION"));

    // No inputs means a single tab piped in on stdin.
    let inputs = if settings.inputs.is_empty() {
        vec![PathBuf::from(STDIN_PATH)]
    } else {
        settings.inputs.clone()
    };

    let tabs = load_tabs(&inputs)?;
    tracing::info!("Analysing {} tab(s)", tabs.len());

    let scale = AlphaScale::new(settings.min_alpha, settings.max_alpha);

    match analyze_tabs(&tabs, &scale) {
        Ok(result) => {
            let rendered = if settings.wants_json() {
                report::render_json(&result)?
            } else {
                report::render_text(&result)?
            };
            println!("{}", rendered);
            Ok(())
        }
        Err(err) if err.is_input_failure() => {
            tracing::warn!("{}", err);
            eprintln!("{}", err.user_message());
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}
