// src/output/mod.rs
//! Artifact writing. Files are only rewritten when their content changes,
//! so an identical re-run leaves the output directory untouched.

pub mod csv;
pub mod json;
pub mod markdown;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::pipeline::Brief;
use crate::snapshot::RunSnapshot;

pub const INDEX_MD: &str = "index.md";
pub const LATEST_JSON: &str = "latest.json";
pub const LAST_RUN_JSON: &str = "last_run.json";
pub const LATEST_CSV: &str = "latest.csv";

/// Returns `true` when the file was (re)written.
pub async fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if let Ok(existing) = fs::read_to_string(path).await {
        if existing == content {
            debug!(target: "output", path = %path.display(), "unchanged, skipped");
            return Ok(false);
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    fs::write(path, content)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    Ok(true)
}

/// Every artifact for one run. Returns the paths that were rewritten.
pub async fn write_all(
    brief: &Brief,
    snapshot: &RunSnapshot,
    out_dir: &Path,
    snapshot_path: &Path,
) -> Result<Vec<PathBuf>> {
    let files = [
        (out_dir.join(INDEX_MD), markdown::render(brief)),
        (out_dir.join(LATEST_JSON), json::render_latest(brief)?),
        (out_dir.join(LAST_RUN_JSON), json::render_last_run(brief)?),
        (out_dir.join(LATEST_CSV), csv::render(&brief.items)?),
        (snapshot_path.to_path_buf(), snapshot.to_json()?),
    ];

    let mut written = Vec::new();
    for (path, content) in files {
        if write_if_changed(&path, &content).await? {
            written.push(path);
        }
    }
    info!(target: "output", written = written.len(), out_dir = %out_dir.display(), "artifacts written");
    Ok(written)
}
