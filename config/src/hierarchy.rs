//! # Configuration Hierarchy
//!
//! Resolves keys across layered stores.
//!
//! # Precedence Order
//! 1. Overrides (explicit `set` calls, highest priority)
//! 2. Named sources, in registration order
//! 3. Defaults (lowest priority, untouched by `reset`)
//!
//! A stored nil counts as absent at every layer.

use async_trait::async_trait;
use errors::ConfigError;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use strata_core::flatten::unflatten;
use strata_core::namespace;
use strata_core::{Configurable, KeyStore, Snapshot, Source, Value, Writable, from_value, save_source};
use tracing::{debug, info, warn};

type Registry = Vec<(String, Arc<dyn Source>)>;

/// Layered configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Combines one overrides store, any number of named sources and one
/// defaults store into a single case-insensitive view.
///
/// ## Usage
/// ```rust,no_run
/// use adapters::JsonSource;
/// use config::{Configurable, Hierarchy};
/// use std::sync::Arc;
///
/// # async fn run() -> errors::Result<()> {
/// let cfg = Hierarchy::new();
/// cfg.set_default("server.port", 8080);
/// cfg.use_source("file", Arc::new(JsonSource::new("app.json"))).await;
/// cfg.set("server.host", "0.0.0.0");
///
/// let server = cfg.sub("server");
/// assert_eq!(server.get_i64("port"), 8080);
/// # Ok(())
/// # }
/// ```
///
/// ## Sharing
/// Cloning yields another handle onto the same stores. `sub` views share
/// the parent's stores too: writes through a sub land in the root
/// overrides store under the sub's prefix.
#[derive(Clone)]
pub struct Hierarchy {
    overrides: Arc<dyn Source>,
    defaults: Arc<dyn Source>,
    sources: Arc<RwLock<Registry>>,
    prefix: String
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.sources.read().iter().map(|(n, _)| n.clone()).collect();
        f.debug_struct("Hierarchy")
            .field("prefix", &self.prefix)
            .field("sources", &names)
            .finish_non_exhaustive()
    }
}

fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_nil())
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::with_stores(Arc::new(KeyStore::new()), Arc::new(KeyStore::new()))
    }

    /// Build on caller-supplied override and default stores.
    pub fn with_stores(overrides: Arc<dyn Source>, defaults: Arc<dyn Source>) -> Self {
        Self {
            overrides,
            defaults,
            sources: Arc::new(RwLock::new(Vec::new())),
            prefix: String::new()
        }
    }

    /// Dotted path of this view; empty for a root hierarchy.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn scoped(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn scoped_snapshot(&self, snapshot: Option<&Snapshot>) -> Option<Snapshot> {
        snapshot.map(|s| {
            s.iter()
                .map(|(k, v)| (self.scoped(k), v.clone()))
                .collect()
        })
    }

    fn registered(&self) -> Registry {
        self.sources.read().clone()
    }

    /// Resolve `key`: overrides, then named sources, then defaults.
    pub fn get(&self, key: &str) -> Option<Value> {
        let key = self.scoped(key);
        if let Some(value) = present(self.overrides.get(&key)) {
            return Some(value);
        }
        for (_, source) in self.registered() {
            if let Some(value) = present(source.get(&key)) {
                return Some(value);
            }
        }
        present(self.defaults.get(&key))
    }

    pub fn get_default(&self, key: &str) -> Option<Value> {
        present(self.defaults.get(&self.scoped(key)))
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.overrides.set(&self.scoped(key), value.into());
    }

    pub fn set_default(&self, key: &str, value: impl Into<Value>) {
        self.defaults.set(&self.scoped(key), value.into());
    }

    pub fn bulk_set<I, K, V>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>
    {
        for (key, value) in entries {
            self.set(key.as_ref(), value);
        }
    }

    /// Drop an override so the key falls back to sources and defaults.
    pub fn unset(&self, key: &str) {
        self.overrides.unset(&self.scoped(key));
    }

    /// Clear overrides and every named source, optionally re-seeding the
    /// overrides from `snapshot`. Defaults are kept.
    ///
    /// On a sub view only keys under its prefix are touched.
    pub fn reset(&self, snapshot: Option<&Snapshot>) {
        let scoped = self.scoped_snapshot(snapshot);
        for (_, source) in self.registered() {
            source.reset(scoped.as_ref());
        }
        if self.prefix.is_empty() {
            self.overrides.reset(snapshot);
        } else {
            self.overrides.unset_scope(&self.prefix);
            for (key, value) in scoped.into_iter().flatten() {
                self.overrides.set(&key, value);
            }
        }
        debug!(prefix = %self.prefix, "Reset configuration");
    }

    pub fn reset_defaults(&self, snapshot: Option<&Snapshot>) {
        if self.prefix.is_empty() {
            self.defaults.reset(snapshot);
            return;
        }
        self.defaults.unset_scope(&self.prefix);
        for (key, value) in self.scoped_snapshot(snapshot).into_iter().flatten() {
            self.defaults.set(&key, value);
        }
    }

    /// Look up a registered source by name.
    pub fn source(&self, name: &str) -> Option<Arc<dyn Source>> {
        self.sources
            .read()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| Arc::clone(s))
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.read().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Add `source` under `name` without loading it. A name that is
    /// already registered keeps its position.
    pub fn register(&self, name: &str, source: Arc<dyn Source>) {
        let mut sources = self.sources.write();
        match sources.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = source,
            None => sources.push((name.to_string(), source))
        }
    }

    /// Register `source` under `name` and load it right away.
    ///
    /// A failed load is logged and the source stays registered (empty or
    /// with whatever it held before).
    pub async fn use_source(&self, name: &str, source: Arc<dyn Source>) -> Arc<dyn Source> {
        self.register(name, Arc::clone(&source));
        match source.load().await {
            Ok(()) => info!(name, source = %source.describe(), "Registered configuration source"),
            Err(e) => warn!(name, source = %source.describe(), error = %e, "Configuration source failed to load")
        }
        source
    }

    /// Load overrides, defaults and every named source. All of them are
    /// attempted; the first failure is returned.
    pub async fn load(&self) -> errors::Result<()> {
        let mut targets: Registry = vec![
            ("overrides".to_string(), Arc::clone(&self.overrides)),
            ("defaults".to_string(), Arc::clone(&self.defaults)),
        ];
        targets.extend(self.registered());

        let mut first_error: Option<ConfigError> = None;
        for (name, source) in targets {
            if let Err(e) = source.load().await {
                warn!(source = %name, error = %e, "Failed to load configuration source");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Save every writable named source, then the overrides store.
    pub async fn save(&self) -> errors::Result<()> {
        let mut targets = self.registered();
        targets.push(("overrides".to_string(), Arc::clone(&self.overrides)));

        let mut first_error: Option<ConfigError> = None;
        for (name, source) in targets {
            if let Err(e) = save_source(source.as_ref()).await {
                warn!(source = %name, error = %e, "Failed to save configuration source");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Every resolvable key with its winning value, using the same
    /// precedence as `get`. Sub views report keys relative to their prefix.
    pub fn all(&self) -> Snapshot {
        let mut merged: BTreeMap<String, (String, Value)> = BTreeMap::new();
        let mut absorb = |snapshot: Snapshot| {
            for (key, value) in snapshot {
                if value.is_nil() {
                    continue;
                }
                merged.entry(key.to_lowercase()).or_insert((key, value));
            }
        };

        absorb(self.overrides.all());
        for (_, source) in self.registered() {
            absorb(source.all());
        }
        absorb(self.defaults.all());

        merged
            .into_values()
            .filter_map(|(key, value)| {
                if self.prefix.is_empty() {
                    return Some((key, value));
                }
                namespace::scope_suffix(&key, &self.prefix).map(|rest| (rest.to_string(), value))
            })
            .collect()
    }

    /// A view scoped to `namespace`: `sub("a").get("b")` reads `a.b`.
    pub fn sub(&self, namespace: &str) -> Hierarchy {
        let parent = Hierarchy {
            prefix: String::new(),
            ..self.clone()
        };
        Hierarchy {
            overrides: Arc::new(parent),
            defaults: Arc::clone(&self.defaults),
            sources: Arc::new(RwLock::new(Vec::new())),
            prefix: self.scoped(namespace)
        }
    }

    /// Decode the resolved configuration into `T`, rebuilding nested
    /// structure from the flat keys. Scalars are coerced weakly.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> errors::Result<T> {
        from_value(unflatten(&self.all())?)
    }

    /// `key = value` lines for every resolved key, sorted by key.
    pub fn debug_dump(&self) -> String {
        let mut lines: Vec<String> = self
            .all()
            .iter()
            .map(|(key, value)| format!("{key} = {value}"))
            .collect();
        lines.sort_by_key(|line| line.to_lowercase());
        lines.join("\n")
    }
}

impl Configurable for Hierarchy {
    fn get(&self, key: &str) -> Option<Value> {
        Hierarchy::get(self, key)
    }

    fn set(&self, key: &str, value: Value) {
        Hierarchy::set(self, key, value);
    }

    fn unset(&self, key: &str) {
        Hierarchy::unset(self, key);
    }

    fn unset_scope(&self, scope: &str) {
        self.overrides.unset_scope(&self.scoped(scope));
    }

    fn reset(&self, snapshot: Option<&Snapshot>) {
        Hierarchy::reset(self, snapshot);
    }

    fn all(&self) -> Snapshot {
        Hierarchy::all(self)
    }
}

#[async_trait]
impl Source for Hierarchy {
    async fn load(&self) -> errors::Result<()> {
        Hierarchy::load(self).await
    }

    fn as_writable(&self) -> Option<&dyn Writable> {
        Some(self)
    }

    fn describe(&self) -> String {
        if self.prefix.is_empty() {
            "hierarchy".to_string()
        } else {
            format!("hierarchy({})", self.prefix)
        }
    }
}

#[async_trait]
impl Writable for Hierarchy {
    async fn save(&self) -> errors::Result<()> {
        Hierarchy::save(self).await
    }
}
