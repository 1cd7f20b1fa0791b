mod cli;
mod config;
mod error;
mod paths;
mod prep;
mod repair;
mod report;
mod shortcut;
mod sundays;
mod winpath;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::report::OutcomeKind;
use crate::shortcut::{ShortcutStore, WindowsShortcuts};

#[tokio::main]
async fn main() {
    // ── Logging ───────────────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args = cli::Args::parse();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = match args.config.clone().or_else(paths::config_file_path) {
        Some(path) => config::load_or_default(&path).unwrap_or_else(|e| {
            tracing::warn!("{e:#} (using defaults)");
            config::Config::default()
        }),
        None => config::Config::default(),
    };

    let store: Arc<dyn ShortcutStore> = Arc::new(WindowsShortcuts);

    // ── Repair-only run ───────────────────────────────────────────────────────
    if let Some(dir) = &args.repair {
        let dir = PathBuf::from(winpath::expand_env(dir));
        match repair::repair_shortcuts(&dir, store).await {
            Ok(summary) => tracing::info!(
                "Examined {} shortcut(s) in '{}': {} rewritten, {} unchanged, {} failed",
                summary.examined,
                dir.display(),
                summary.rewritten,
                summary.unchanged,
                summary.failed
            ),
            Err(e) => {
                tracing::error!("{e}");
                std::process::exit(1);
            }
        }
        return;
    }

    // ── Prep run ──────────────────────────────────────────────────────────────
    let cwd = match std::env::current_dir().context("Failed to read the working directory") {
        Ok(cwd) => cwd,
        Err(e) => {
            tracing::error!("{e:#}");
            std::process::exit(1);
        }
    };
    let today = chrono::Local::now().date_naive();
    let opts = args.resolve(&config.defaults, today, &cwd);

    tracing::info!(
        "{} {}",
        sundays::month_name(opts.month).unwrap_or("Unknown month"),
        opts.year
    );
    tracing::info!("Using Directory: {}", opts.template_dir);
    if opts.write {
        tracing::info!("Write mode is enabled");
    } else {
        tracing::info!("Write mode is disabled, use --write to write files");
    }

    let report = match prep::run(&opts, store).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Done: {} created, {} planned, {} skipped, {} failed",
        report.count(OutcomeKind::Created),
        report.count(OutcomeKind::Planned),
        report.count(OutcomeKind::Skipped),
        report.count(OutcomeKind::Failed)
    );

    if let Some(path) = args.report.clone().or_else(paths::report_file_path) {
        report::write_report(&path, &report);
    }
}
