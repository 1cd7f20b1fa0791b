use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::prep::PrepMode;

/// Which of the two per-date files was already present.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Existing {
    /// The `TODO` draft.
    Todo,
    /// The finished file.
    Done,
}

/// What happened to one Sunday.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ItemOutcome {
    /// Write mode was off; the copy would have been made.
    Planned,
    /// The copy (and shortcut, in shortcut mode) was made.
    Created,
    /// A draft or finished file already existed.
    Skipped(Existing),
    /// Copying or shortcut creation failed; the message says why.
    Failed(String),
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Planned,
    Created,
    Skipped,
    Failed,
}

/// One `[[items]]` entry of the report.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ItemReport {
    /// `YYYY-MM-DD` of the Sunday.
    pub stem: String,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing: Option<Existing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemReport {
    pub fn new(stem: String, outcome: ItemOutcome) -> Self {
        let (kind, existing, error) = match outcome {
            ItemOutcome::Planned => (OutcomeKind::Planned, None, None),
            ItemOutcome::Created => (OutcomeKind::Created, None, None),
            ItemOutcome::Skipped(e) => (OutcomeKind::Skipped, Some(e), None),
            ItemOutcome::Failed(msg) => (OutcomeKind::Failed, None, Some(msg)),
        };
        Self {
            stem,
            outcome: kind,
            existing,
            error,
        }
    }
}

/// Summary of one prep run, written to %APPDATA%\SundayPrep\last_run.toml.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunReport {
    /// Tool version (set from Cargo.toml at compile time).
    pub version: String,
    pub month: u32,
    pub year: i32,
    pub mode: PrepMode,
    pub write: bool,
    #[serde(default)]
    pub items: Vec<ItemReport>,
}

impl RunReport {
    pub fn new(month: u32, year: i32, mode: PrepMode, write: bool) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            month,
            year,
            mode,
            write,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, stem: String, outcome: ItemOutcome) {
        self.items.push(ItemReport::new(stem, outcome));
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.items.iter().filter(|i| i.outcome == kind).count()
    }
}

/// Serializes `report` to TOML and writes it to `path`.
/// Creates the parent directory if it does not exist.
/// Failures are logged; the run's result does not depend on the report.
pub fn write_report(path: &Path, report: &RunReport) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Failed to create directory {}: {e}", parent.display());
            return;
        }
    }
    match toml::to_string_pretty(report) {
        Ok(content) => {
            if let Err(e) = std::fs::write(path, content) {
                tracing::warn!("Failed to write report file {}: {e}", path.display());
            }
        }
        Err(e) => tracing::warn!("Failed to serialize report: {e}"),
    }
}
