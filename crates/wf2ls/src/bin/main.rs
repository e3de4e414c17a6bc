//! wf2ls CLI

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wf2ls::{ConfigSources, LogProgress, load_config, run};

/// Convert a Workflowy backup into a Logseq graph
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workflowy backup file to convert
    #[arg(short, long, env = "WF2LS_SOURCE")]
    source: Option<PathBuf>,

    /// Graph root directory to write pages and journals into
    #[arg(short, long, env = "WF2LS_DEST")]
    dest: Option<PathBuf>,

    /// Configuration file, applied over ./config.json
    #[arg(short, long, env = "WF2LS_CONFIG")]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    log::info!("wf2ls v{}", env!("CARGO_PKG_VERSION"));

    let sources = ConfigSources {
        config_file: args.config,
        source: args.source,
        dest: args.dest,
        ..Default::default()
    };
    let config = load_config(&sources).context("Failed to load configuration")?;

    let summary = run(&config, Some(Box::new(LogProgress::default())))
        .with_context(|| format!("Failed to convert {}", config.source_file.display()))?;

    log::info!(
        "Wrote {} pages and {} journals to {}",
        summary.pages,
        summary.journals,
        summary.root.display()
    );
    Ok(())
}
