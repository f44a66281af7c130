//! Writing experiment runs and state dumps.

use crate::error::{IoError, Result};
use civitas_core::telemetry::{export, ExperimentRun};
use serde::Serialize;
use std::path::Path;
use tracing::info;

fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| IoError::FileSystem(e).with_context(format!("creating {}", parent.display())))?;
    }
    std::fs::write(path, text)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("writing {}", path.display())))
}

pub fn write_run_json<P: AsRef<Path>>(run: &ExperimentRun, path: P) -> Result<()> {
    let path = path.as_ref();
    write_text(path, &export::to_json(run)?)?;
    info!(run_id = %run.run_id, path = %path.display(), "Experiment exported as JSON");
    Ok(())
}

pub fn write_run_csv<P: AsRef<Path>>(run: &ExperimentRun, path: P) -> Result<()> {
    let path = path.as_ref();
    write_text(path, &export::to_csv(run)?)?;
    info!(run_id = %run.run_id, path = %path.display(), rows = run.snapshots.len(), "Experiment exported as CSV");
    Ok(())
}

/// Pretty JSON dump of any serializable value, e.g. the final government state.
pub fn write_json_file<T: Serialize, P: AsRef<Path>>(data: &T, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {e}")))?;
    write_text(path.as_ref(), &json)
}
