//! JSON document helpers shared by the loaders.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::error::{AnalyticsError, Result};

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| AnalyticsError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| AnalyticsError::json(path, e))
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AnalyticsError::io(parent, e))?;
    }
    let raw = serde_json::to_string(value).map_err(|e| AnalyticsError::json(path, e))?;
    fs::write(path, raw).map_err(|e| AnalyticsError::io(path, e))
}
