//! # KeyStore
//!
//! Case-insensitive flat key/value map. Entries are indexed by the
//! lowercased key and remember the casing of their latest write, which is
//! what `all()` reports.

use crate::flatten::flatten;
use crate::namespace;
use crate::traits::{Configurable, Source};
use crate::types::{Snapshot, Value};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    value: Value
}

#[derive(Debug, Default)]
pub struct KeyStore {
    entries: RwLock<BTreeMap<String, Entry>>
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let store = Self::new();
        store.reset(Some(snapshot));
        store
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn insert(entries: &mut BTreeMap<String, Entry>, key: &str, value: Value) {
        if key.is_empty() {
            tracing::warn!("Ignoring write to the empty key");
            return;
        }
        if value.is_scalar() {
            entries.insert(
                key.to_lowercase(),
                Entry {
                    key: key.to_string(),
                    value
                }
            );
            return;
        }
        let mut flat = Snapshot::new();
        flatten(&value, key, &mut flat);
        for (flat_key, flat_value) in flat {
            entries.insert(
                flat_key.to_lowercase(),
                Entry {
                    key: flat_key,
                    value: flat_value
                }
            );
        }
    }
}

impl Configurable for KeyStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .get(&key.to_lowercase())
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: Value) {
        Self::insert(&mut self.entries.write(), key, value);
    }

    fn unset(&self, key: &str) {
        self.entries.write().remove(&key.to_lowercase());
    }

    fn unset_scope(&self, scope: &str) {
        self.entries
            .write()
            .retain(|key, _| !namespace::is_within(key, scope));
    }

    fn reset(&self, snapshot: Option<&Snapshot>) {
        let mut entries = self.entries.write();
        entries.clear();
        for (key, value) in snapshot.into_iter().flatten() {
            Self::insert(&mut entries, key, value.clone());
        }
    }

    /// Returns a copy; mutating it does not touch the store.
    fn all(&self) -> Snapshot {
        self.entries
            .read()
            .values()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }
}

#[async_trait]
impl Source for KeyStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::time::Duration;

    #[test]
    fn test_set_and_get() {
        let store = KeyStore::new();
        store.set("test", "abc".into());
        assert_eq!(store.get("test"), Some(Value::from("abc")));
    }

    #[test]
    fn test_case_insensitive_single_entry() {
        let store = KeyStore::new();
        store.set("test", "abc".into());
        store.set("TEST", "def".into());
        assert_eq!(store.get("test"), Some(Value::from("def")));
        assert_eq!(store.get("TEST"), Some(Value::from("def")));
        assert_eq!(store.get("TeSt"), Some(Value::from("def")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_case_preserving_all() {
        let store = KeyStore::new();
        store.set("tEsT", "abc".into());
        let all = store.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all.get("tEsT"), Some(&Value::from("abc")));
        assert!(!all.contains_key("test"));
    }

    #[test]
    fn test_absent_differs_from_stored_nil() {
        let store = KeyStore::new();
        store.set("cleared", Value::Nil);
        assert_eq!(store.get("cleared"), Some(Value::Nil));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_reset_empties() {
        let store = KeyStore::new();
        store.set("test", "abc".into());
        store.reset(None);
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_reset_with_snapshot_normalizes_case() {
        let store = KeyStore::new();
        store.set("stale", "x".into());
        let mut snapshot = Snapshot::new();
        snapshot.insert("Test".into(), Value::from("abc"));
        snapshot.insert("test_abc".into(), Value::from("123"));
        store.reset(Some(&snapshot));
        assert_eq!(store.get("TEST"), Some(Value::from("abc")));
        assert_eq!(store.get("stale"), None);
        assert_eq!(store.len(), 2);

        let copy = KeyStore::from_snapshot(&store.all());
        assert_eq!(copy.get("test"), store.get("test"));
    }

    #[test]
    fn test_set_list_flattens() {
        let store = KeyStore::new();
        store.set("A", vec!["x", "y"].into());
        assert_eq!(store.get_i32("a.length"), 2);
        assert_eq!(store.get("A[0]"), Some(Value::from("x")));
        assert_eq!(store.get("A"), None);
    }

    #[test]
    fn test_empty_key_ignored() {
        let store = KeyStore::new();
        store.set("", "x".into());
        assert!(store.is_empty());
    }

    #[test]
    fn test_typed_accessors_zero_on_miss() {
        let store = KeyStore::new();
        assert_eq!(store.get_string("nope"), "");
        assert!(!store.get_bool("nope"));
        assert_eq!(store.get_i32("nope"), 0);
        assert_eq!(store.get_i64("nope"), 0);
        assert_eq!(store.get_f64("nope"), 0.0);
        assert_eq!(store.get_time("nope"), DateTime::<chrono::Utc>::default());
        assert_eq!(store.get_duration("nope"), Duration::ZERO);
    }

    #[test]
    fn test_typed_accessors_coerce_strings() {
        let store = KeyStore::new();
        store.set("port", "5432".into());
        store.set("debug", "true".into());
        store.set("timeout", "1m30s".into());
        assert_eq!(store.get_i64("port"), 5432);
        assert!(store.get_bool("debug"));
        assert_eq!(store.get_duration("timeout"), Duration::from_secs(90));
        assert_eq!(store.get_i32("debug"), 0);
    }

    #[test]
    fn test_unset_scope_only_touches_nested_keys() {
        let store = KeyStore::new();
        store.set("a", 1.into());
        store.set("a.b", 2.into());
        store.set("A.c.d", 3.into());
        store.set("ab", 4.into());
        store.unset_scope("a");
        let keys: Vec<String> = store.all().into_keys().collect();
        assert_eq!(keys, vec!["a".to_string(), "ab".to_string()]);
    }

    #[tokio::test]
    async fn test_memory_load_is_noop() {
        let store = KeyStore::new();
        store.set("kept", true.into());
        store.load().await.unwrap();
        assert!(store.as_writable().is_none());
        assert!(store.get_bool("kept"));
    }
}
