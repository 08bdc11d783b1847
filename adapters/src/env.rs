//! # Environment Source
//!
//! Reads process environment variables into a `KeyStore`.
//!
//! Each variable name goes through the same pipeline:
//! 1. the configured prefix is stripped (`MYAPP_PORT` -> `PORT`)
//! 2. namespace resolution turns `POSTGRES_HOST` into `POSTGRES.HOST` when
//!    `postgres` is a namespace
//!
//! Loading merges into the existing store; it never clears it.

use async_trait::async_trait;
use strata_core::namespace;
use strata_core::{Configurable, KeyStore, Source, Value};
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct EnvSource {
    store: KeyStore,
    prefix: String,
    namespaces: Vec<String>,
    vars: Option<Vec<(String, String)>>
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>
    {
        self.namespaces = namespace::normalize_namespaces(namespaces);
        self
    }

    /// Read from `vars` instead of the process environment.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect()
        );
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    fn read_vars(&self) -> Vec<(String, String)> {
        if let Some(vars) = &self.vars {
            return vars.clone();
        }
        std::env::vars_os()
            .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => Some((name, value)),
                (name, _) => {
                    trace!(?name, "Skipping non UTF-8 environment variable");
                    None
                }
            })
            .collect()
    }

    fn resolve_key(&self, name: &str) -> String {
        namespace::resolve(
            namespace::strip_prefix(name, &self.prefix),
            &self.namespaces
        )
    }
}

strata_core::impl_configurable!(EnvSource, store);

#[async_trait]
impl Source for EnvSource {
    async fn load(&self) -> errors::Result<()> {
        let vars = self.read_vars();
        let mut loaded = 0usize;
        for (name, value) in vars {
            let key = self.resolve_key(&name);
            if key.is_empty() {
                continue;
            }
            self.store.set(&key, Value::String(value));
            loaded += 1;
        }
        debug!(prefix = %self.prefix, loaded, "Loaded environment variables");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("env(prefix={})", self.prefix)
    }
}
