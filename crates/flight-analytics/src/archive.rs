//! Archiving finished runs under `<out_dir>/<name>/<name>-<n>`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnalyticsError, Result};

/// Directory of trial `index` (1-based) recorded by `name`.
pub fn trial_dir(out_dir: &Path, name: &str, index: usize) -> PathBuf {
    out_dir.join(name).join(format!("{name}-{index}"))
}

/// Number of trials already archived for `name`.
///
/// # Errors
///
/// The name directory exists but cannot be listed.
pub fn count_trials(out_dir: &Path, name: &str) -> Result<usize> {
    let dir = out_dir.join(name);
    if !dir.exists() {
        return Ok(0);
    }
    let mut count = 0;
    for entry in fs::read_dir(&dir).map_err(|e| AnalyticsError::io(&dir, e))? {
        let entry = entry.map_err(|e| AnalyticsError::io(&dir, e))?;
        if entry.file_name().to_string_lossy().starts_with(name) {
            count += 1;
        }
    }
    Ok(count)
}

/// Move everything in `data_dir` into the next trial directory of `name`
/// and return that directory.
///
/// # Errors
///
/// `NoData` when `data_dir` is empty or missing, `InvalidParameter` for a
/// name that is not a single path component, `TrialExists` when the next
/// trial directory is already taken, and IO failures.
pub fn archive_trial(data_dir: &Path, out_dir: &Path, name: &str) -> Result<PathBuf> {
    validate_name(name)?;

    let entries: Vec<PathBuf> = match fs::read_dir(data_dir) {
        Ok(rd) => rd
            .map(|e| e.map(|e| e.path()))
            .collect::<std::io::Result<_>>()
            .map_err(|e| AnalyticsError::io(data_dir, e))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(AnalyticsError::io(data_dir, e)),
    };
    if entries.is_empty() {
        return Err(AnalyticsError::NoData(data_dir.to_path_buf()));
    }

    let parent = out_dir.join(name);
    fs::create_dir_all(&parent).map_err(|e| AnalyticsError::io(&parent, e))?;

    // Never merge into an existing trial
    let target = trial_dir(out_dir, name, count_trials(out_dir, name)? + 1);
    fs::create_dir(&target).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => AnalyticsError::TrialExists(target.clone()),
        _ => AnalyticsError::io(&target, e),
    })?;

    for source in &entries {
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let dest = target.join(file_name);
        fs::rename(source, &dest).map_err(|e| AnalyticsError::io(source, e))?;
    }

    tracing::info!(
        name,
        files = entries.len(),
        dir = %target.display(),
        "Trial archived"
    );
    Ok(target)
}

fn validate_name(name: &str) -> Result<()> {
    let single_component = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    if single_component {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidParameter(format!(
            "trial name {name:?} must be a plain directory name"
        )))
    }
}
