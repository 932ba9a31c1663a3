use anyhow::Context;
use clap::Parser;
use tracing::debug;

use forfait_cli::{app, cli::Cli, config::Settings, logging};

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::resolve(&cli).context("failed to load configuration")?;
    logging::init_logging(&settings.log_level, settings.log_file.as_deref())?;
    debug!(?settings, "resolved settings");

    let output = app::run(&cli.command, &settings)?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
