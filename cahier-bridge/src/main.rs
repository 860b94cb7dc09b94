use std::process::ExitCode;

use anyhow::{Context, Result};
use cahier_bridge::config::{Cli, Settings};
use cahier_bridge::{app, export, logging};
use cahier_core::store::Store;
use cahier_core::NotebookEngine;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = Settings::from_cli(Cli::parse());
    let _log_guard = logging::init(&settings.log_dir);

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {:#}", e);
            eprintln!("cahier: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<()> {
    let store = Store::open(&settings.db_path)
        .with_context(|| format!("opening {}", settings.db_path.display()))?;

    if settings.export {
        let stdout = std::io::stdout();
        let n = export::write_jsonl(&store, stdout.lock())?;
        tracing::info!(records = n, "exported command log");
        return Ok(());
    }

    let runner = settings.runner();
    tracing::info!(db = %settings.db_path.display(), shell = runner.program(), "starting");

    let (engine, completions) =
        NotebookEngine::start(store, runner).context("starting notebook")?;
    app::run(engine, completions).await
}
