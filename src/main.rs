mod app;
mod case;
mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::{InvestigationBoardApp, SnapshotSources, StdoutHost};
use config::BoardConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Case snapshot (JSON) to open the board with.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Partial snapshot merged into the board after it opens. Repeatable.
    #[arg(long = "merge")]
    merges: Vec<PathBuf>,

    /// Pause before each merge, simulating a live feed.
    #[arg(long, default_value_t = 0)]
    merge_delay_ms: u64,

    /// Board configuration (JSON); missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("investigation_board=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };
    let sources = SnapshotSources {
        initial: args.snapshot,
        merges: args.merges,
        delay: Duration::from_millis(args.merge_delay_ms),
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([config.viewport.width, config.viewport.height]),
        ..Default::default()
    };

    eframe::run_native(
        "Investigation Board",
        options,
        Box::new(move |cc| {
            Ok(Box::new(InvestigationBoardApp::new(
                cc,
                sources,
                config,
                Box::new(StdoutHost),
            )))
        }),
    )
    .map_err(|error| anyhow::anyhow!("{error}"))
    .context("board window failed")
}
