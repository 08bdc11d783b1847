//! # JSON File Source
//!
//! Loads a JSON document from disk and flattens it into dotted keys.
//! Saving writes the current store contents back as pretty-printed JSON
//! with flat keys, so a load after a save returns exactly what was saved.

use async_trait::async_trait;
use errors::ConfigError;
use std::path::{Path, PathBuf};
use strata_core::flatten::flatten_root;
use strata_core::{Configurable, KeyStore, Source, Value, Writable};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

#[derive(Debug)]
pub struct JsonSource {
    store: KeyStore,
    path: PathBuf
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: KeyStore::new(),
            path: path.into()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

strata_core::impl_configurable!(JsonSource, store);

#[async_trait]
impl Source for JsonSource {
    /// Replaces the store contents with the file's. On any error the store
    /// is left untouched.
    async fn load(&self) -> errors::Result<()> {
        let resource = self.path.display();
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ConfigError::io(&resource, e))?;
        let document =
            Value::from_json_slice(&bytes).map_err(|e| ConfigError::parse(&resource, e))?;
        let flat = flatten_root(&document, &resource.to_string())?;

        self.store.reset(Some(&flat));
        info!(path = %resource, keys = flat.len(), "Loaded JSON configuration");
        Ok(())
    }

    fn as_writable(&self) -> Option<&dyn Writable> {
        Some(self)
    }

    fn describe(&self) -> String {
        format!("json({})", self.path.display())
    }
}

#[async_trait]
impl Writable for JsonSource {
    async fn save(&self) -> errors::Result<()> {
        let resource = self.path.display();
        let snapshot = self.store.all();
        let bytes =
            serde_json::to_vec_pretty(&snapshot).map_err(|e| ConfigError::parse(&resource, e))?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&self.path)
            .await
            .map_err(|e| ConfigError::io(&resource, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| ConfigError::io(&resource, e))?;
        file.flush()
            .await
            .map_err(|e| ConfigError::io(&resource, e))?;

        debug!(path = %resource, keys = snapshot.len(), "Saved JSON configuration");
        Ok(())
    }
}
