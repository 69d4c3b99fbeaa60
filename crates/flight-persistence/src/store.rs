//! # Document Stores
//!
//! Storage backends for named JSON documents. A document name is the
//! channel name it arrived on; writing a name again replaces the previous
//! document.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::error::{PersistenceError, Result};

/// Storage for named JSON documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write `document` under `name`, replacing any previous document
    async fn put(&self, name: &str, document: &Value) -> Result<()>;

    /// Read the document stored under `name`
    async fn get(&self, name: &str) -> Result<Option<Value>>;
}

/// Reject names that are empty or could escape the base directory.
fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidChannel(name.to_string()))
    }
}

// =============================================================================
// JSON FILES
// =============================================================================

/// Writes each document to `<base_dir>/<name>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// File path backing the document `name`
    ///
    /// # Errors
    ///
    /// Returns `InvalidChannel` for names that are not plain identifiers.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.base_dir.join(format!("{name}.json")))
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn put(&self, name: &str, document: &Value) -> Result<()> {
        let path = self.path_for(name)?;
        let bytes = serde_json::to_vec(document)?;

        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| PersistenceError::io(&self.base_dir, e))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| PersistenceError::io(&path, e))?;

        tracing::debug!(path = %path.display(), "Document file written");
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Value>> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::io(&path, e)),
        }
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// In-memory store, handy for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every stored document, sorted
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.documents.lock().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, name: &str, document: &Value) -> Result<()> {
        validate_name(name)?;
        self.documents
            .lock()
            .await
            .insert(name.to_string(), document.clone());
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Value>> {
        validate_name(name)?;
        Ok(self.documents.lock().await.get(name).cloned())
    }
}
