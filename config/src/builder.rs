//! # Hierarchy Builder
//!
//! Wires the conventional source stack in one place.
//!
//! # Precedence Order
//! 1. Overrides (`set`)
//! 2. Command-line flags
//! 3. Environment variables
//! 4. Remote JSON documents (later URLs win)
//! 5. JSON files (later files win)
//! 6. Defaults (`set_default`)

use crate::hierarchy::Hierarchy;
use adapters::{EnvSource, FlagSource, JsonSource, UrlSource};
use std::path::PathBuf;
use std::sync::Arc;
use strata_core::Value;
use tracing::warn;

#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    files: Vec<PathBuf>,
    urls: Vec<String>,
    env_prefix: Option<String>,
    namespaces: Vec<String>,
    flags: Option<FlagSource>,
    overrides: Vec<(String, Value)>,
    defaults: Vec<(String, Value)>,
    client: Option<reqwest::Client>
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    /// Read environment variables, stripping `prefix` from their names.
    pub fn env(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Namespace applied to the env source. Flag sources carry their own.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    pub fn flags(mut self, flags: FlagSource) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    pub fn set_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.push((key.into(), value.into()));
        self
    }

    /// HTTP client shared by every URL source.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Register every source without loading any of them.
    pub fn assemble(self) -> Hierarchy {
        let hierarchy = Hierarchy::new();
        for (key, value) in self.defaults {
            hierarchy.set_default(&key, value);
        }

        if let Some(flags) = self.flags {
            hierarchy.register("flags", Arc::new(flags));
        }
        if let Some(prefix) = self.env_prefix {
            let env = EnvSource::new(prefix).with_namespaces(&self.namespaces);
            hierarchy.register("env", Arc::new(env));
        }
        for url in self.urls.into_iter().rev() {
            let source = match &self.client {
                Some(client) => UrlSource::with_client(url.clone(), client.clone()),
                None => UrlSource::new(url.clone())
            };
            hierarchy.register(&format!("url:{url}"), Arc::new(source));
        }
        for path in self.files.into_iter().rev() {
            let name = format!("file:{}", path.display());
            hierarchy.register(&name, Arc::new(JsonSource::new(path)));
        }

        for (key, value) in self.overrides {
            hierarchy.set(&key, value);
        }
        hierarchy
    }

    /// Build and load every source. Load failures are logged and the
    /// failing source simply contributes nothing.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Usage
    /// ```rust,no_run
    /// use config::{Configurable, HierarchyBuilder};
    ///
    /// # async fn run() {
    /// let cfg = HierarchyBuilder::new()
    ///     .file("/etc/myapp/config.json")
    ///     .env("MYAPP_")
    ///     .namespace("postgres")
    ///     .set_default("postgres.port", 5432)
    ///     .build()
    ///     .await;
    /// println!("PostgreSQL host: {}", cfg.get_string("postgres.host"));
    /// # }
    /// ```
    pub async fn build(self) -> Hierarchy {
        let hierarchy = self.assemble();
        if let Err(e) = hierarchy.load().await {
            warn!(error = %e, "Continuing with partially loaded configuration");
        }
        hierarchy
    }

    /// Like `build`, but the first load failure is returned.
    pub async fn try_build(self) -> errors::Result<Hierarchy> {
        let hierarchy = self.assemble();
        hierarchy.load().await?;
        Ok(hierarchy)
    }
}
