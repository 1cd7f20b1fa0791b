/// Per-Sunday preparation: decide for every Sunday of the month whether a copy
/// of the template is needed, and make it.
///
/// Dates are processed one after another and every item has finished by the
/// time [`run`] returns. A failure on one date is logged and recorded in the
/// report; the remaining dates are still processed.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PrepError;
use crate::report::{Existing, ItemOutcome, RunReport};
use crate::repair;
use crate::shortcut::{self, ShortcutMeta, ShortcutStore, SHORTCUT_EXTENSION};
use crate::sundays::{folder_name, sunday_stem, sundays_in_month};
use crate::winpath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PrepMode {
    /// Copy the template to `<output>/<date> TODO.<ext>`.
    Copy,
    /// Copy the template into `<output>/<YYYYMMDD>/` and drop a
    /// `<date> TODO.lnk` shortcut to it in the template directory.
    #[default]
    Shortcut,
}

/// Fully resolved inputs for one run. Directories may contain `%VAR%`
/// references; they are expanded only when the filesystem is touched.
#[derive(Debug, Clone)]
pub struct PrepOptions {
    pub month: u32,
    pub year: i32,
    pub template_file: String,
    pub template_dir: String,
    pub output_dir: String,
    pub extension: String,
    pub mode: PrepMode,
    pub write: bool,
}

impl PrepOptions {
    /// Template path as written, before `%VAR%` expansion.
    pub fn template_path(&self) -> PathBuf {
        Path::new(&self.template_dir).join(&self.template_file)
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(winpath::expand_env(&path.to_string_lossy()))
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(expand(path)).await.unwrap_or(false)
}

/// Fails with [`PrepError::TemplateNotFound`] unless the template is a file.
/// Returns the expanded template path.
pub async fn check_template(opts: &PrepOptions) -> Result<PathBuf, PrepError> {
    let template = expand(&opts.template_path());
    match tokio::fs::metadata(&template).await {
        Ok(meta) if meta.is_file() => {
            tracing::info!("Found template: '{}'", opts.template_path().display());
            Ok(template)
        }
        _ => Err(PrepError::TemplateNotFound {
            file: opts.template_file.clone(),
            dir: opts.template_dir.clone(),
        }),
    }
}

/// Runs the preparation for every Sunday of `opts.month`.
///
/// Only an invalid month or a missing template fail the whole run.
pub async fn run(opts: &PrepOptions, store: Arc<dyn ShortcutStore>) -> Result<RunReport, PrepError> {
    let days = sundays_in_month(opts.month, opts.year)?;
    let template = check_template(opts).await?;

    let mut report = RunReport::new(opts.month, opts.year, opts.mode, opts.write);
    for day in days {
        let stem = sunday_stem(opts.year, opts.month, day);
        let outcome = match opts.mode {
            PrepMode::Copy => prep_copy(opts, &template, &stem).await,
            PrepMode::Shortcut => prep_shortcut(opts, &template, &stem, Arc::clone(&store)).await,
        };
        report.push(stem, outcome);
    }
    Ok(report)
}

/// Returns which of `todo` / `done` already exists, preferring the draft.
async fn existing(todo: &Path, done: &Path) -> Option<Existing> {
    if exists(todo).await {
        Some(Existing::Todo)
    } else if exists(done).await {
        Some(Existing::Done)
    } else {
        None
    }
}

fn log_skip(opts: &PrepOptions, stem: &str, found: Existing) {
    let todo = if found == Existing::Todo { " TODO" } else { "" };
    let suffix = if opts.write { ", not overwriting" } else { "" };
    tracing::info!("'{stem}{todo}' already exists{suffix}");
}

async fn copy_template(template: &Path, dest: &Path) -> Result<(), PrepError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PrepError::filesystem(parent, e))?;
    }
    tokio::fs::copy(template, dest)
        .await
        .map_err(|e| PrepError::filesystem(dest, e))?;
    Ok(())
}

async fn prep_copy(opts: &PrepOptions, template: &Path, stem: &str) -> ItemOutcome {
    let out_dir = Path::new(&opts.output_dir);
    let todo = out_dir.join(format!("{stem} TODO.{}", opts.extension));
    let done = out_dir.join(format!("{stem}.{}", opts.extension));

    if let Some(found) = existing(&todo, &done).await {
        log_skip(opts, stem, found);
        return ItemOutcome::Skipped(found);
    }
    if !opts.write {
        tracing::info!("Will copy '{}' to '{}'", opts.template_file, todo.display());
        return ItemOutcome::Planned;
    }

    tracing::info!("Copying '{}' to '{stem}'", opts.template_file);
    match copy_template(template, &expand(&todo)).await {
        Ok(()) => ItemOutcome::Created,
        Err(e) => {
            tracing::error!("Error copying template for {stem}: {e}");
            ItemOutcome::Failed(e.to_string())
        }
    }
}

async fn prep_shortcut(
    opts: &PrepOptions,
    template: &Path,
    stem: &str,
    store: Arc<dyn ShortcutStore>,
) -> ItemOutcome {
    let template_dir = Path::new(&opts.template_dir);
    let todo = template_dir.join(format!("{stem} TODO.{SHORTCUT_EXTENSION}"));
    let done = template_dir.join(format!("{stem}.{SHORTCUT_EXTENSION}"));

    if let Some(found) = existing(&todo, &done).await {
        log_skip(opts, stem, found);
        return ItemOutcome::Skipped(found);
    }

    let folder = Path::new(&opts.output_dir).join(folder_name(stem));
    let file_path = folder.join(format!("{stem}.{}", opts.extension));

    if !opts.write {
        tracing::info!("Will copy '{}' to '{}'", opts.template_file, file_path.display());
        return ItemOutcome::Planned;
    }

    tracing::info!("Copying '{}' to '{stem}'", opts.template_file);
    if let Err(e) = copy_template(template, &expand(&file_path)).await {
        tracing::error!("Error copying template for {stem}: {e}");
        return ItemOutcome::Failed(e.to_string());
    }

    // Shortcuts already in the date folder may predate the portable form.
    if let Err(e) = repair::repair_shortcuts(&expand(&folder), Arc::clone(&store)).await {
        tracing::warn!("Skipping shortcut repair in '{}': {e}", folder.display());
    }

    let target = winpath::normalize(&file_path.to_string_lossy());
    let meta = ShortcutMeta::new(target, format!("Sunday {stem}"));
    match shortcut::create(store, expand(&todo), meta).await {
        Ok(()) => ItemOutcome::Created,
        Err(e) => {
            tracing::error!("Error creating shortcut '{}': {e}", todo.display());
            ItemOutcome::Failed(e.to_string())
        }
    }
}
