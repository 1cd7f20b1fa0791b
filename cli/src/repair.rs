/// Shortcut repair: rewrite absolute OneDrive paths in existing `.lnk` files.
///
/// Each shortcut is handled on its own. A failed read or write is logged and
/// the scan moves on; nothing is retried and a shortcut whose metadata could
/// not be read is never written.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PrepError;
use crate::shortcut::{self, ShortcutStore, SHORTCUT_EXTENSION};
use crate::winpath;

/// Outcome counts for one scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepairSummary {
    /// Shortcuts found in the directory.
    pub examined: usize,
    /// Shortcuts whose metadata changed and was written back.
    pub rewritten: usize,
    /// Shortcuts read successfully that needed no change; never written.
    pub unchanged: usize,
    /// Shortcuts whose metadata could not be read or written.
    pub failed: usize,
}

/// Lists `.lnk` files directly inside `dir`, sorted by name.
pub async fn list_shortcuts(dir: &Path) -> Result<Vec<PathBuf>, PrepError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| PrepError::filesystem(dir, e))?;

    let mut found = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PrepError::filesystem(dir, e))?
    {
        let path = entry.path();
        let is_shortcut = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SHORTCUT_EXTENSION));
        if is_shortcut {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Normalises the target and working directory of every shortcut in `dir`.
///
/// Only failing to list `dir` is an error; per-shortcut failures are counted
/// in [`RepairSummary::failed`].
pub async fn repair_shortcuts(
    dir: &Path,
    store: Arc<dyn ShortcutStore>,
) -> Result<RepairSummary, PrepError> {
    let shortcuts = list_shortcuts(dir).await?;
    let mut summary = RepairSummary {
        examined: shortcuts.len(),
        ..RepairSummary::default()
    };

    for path in shortcuts {
        match repair_one(Arc::clone(&store), path.clone()).await {
            Ok(true) => summary.rewritten += 1,
            Ok(false) => summary.unchanged += 1,
            Err(e) => {
                tracing::error!(shortcut = %path.display(), "Error repairing shortcut: {e}");
                summary.failed += 1;
            }
        }
    }

    tracing::debug!(
        dir = %dir.display(),
        examined = summary.examined,
        rewritten = summary.rewritten,
        unchanged = summary.unchanged,
        failed = summary.failed,
        "Shortcut repair finished"
    );
    Ok(summary)
}

/// Returns whether the shortcut was written. Empty fields stay empty, and a
/// shortcut that normalises to itself is left untouched on disk.
async fn repair_one(store: Arc<dyn ShortcutStore>, path: PathBuf) -> Result<bool, PrepError> {
    let original = shortcut::query(Arc::clone(&store), path.clone()).await?;

    let mut meta = original.clone();
    if !meta.target.is_empty() {
        meta.target = winpath::normalize(&meta.target);
    }
    if !meta.working_dir.is_empty() {
        meta.working_dir = winpath::normalize(&meta.working_dir);
    }

    if meta == original {
        return Ok(false);
    }
    shortcut::edit(store, path, meta).await?;
    Ok(true)
}
