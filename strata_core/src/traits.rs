//! Core traits for configuration stores and sources

use crate::cast;
use crate::types::{Snapshot, Value};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A readable and writable flat key/value surface.
///
/// Lookups are case-insensitive. Typed accessors never fail: absent or
/// uncoercible values come back as the zero value of the type.
pub trait Configurable: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`. Lists and maps are flattened.
    fn set(&self, key: &str, value: Value);

    fn unset(&self, key: &str);

    /// Remove every key nested below `scope` (`scope.*`).
    fn unset_scope(&self, scope: &str) {
        for key in self.all().into_keys() {
            if crate::namespace::is_within(&key, scope) {
                self.unset(&key);
            }
        }
    }

    /// Empty the store, then re-insert `snapshot` if given.
    fn reset(&self, snapshot: Option<&Snapshot>);

    /// A copy of every entry.
    fn all(&self) -> Snapshot;

    fn get_string(&self, key: &str) -> String {
        self.get(key)
            .and_then(|v| cast::to_string(&v))
            .unwrap_or_default()
    }

    fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .and_then(|v| cast::to_bool(&v))
            .unwrap_or_default()
    }

    fn get_i32(&self, key: &str) -> i32 {
        self.get(key).and_then(|v| cast::to_i32(&v)).unwrap_or_default()
    }

    fn get_i64(&self, key: &str) -> i64 {
        self.get(key).and_then(|v| cast::to_i64(&v)).unwrap_or_default()
    }

    fn get_f64(&self, key: &str) -> f64 {
        self.get(key).and_then(|v| cast::to_f64(&v)).unwrap_or_default()
    }

    fn get_time(&self, key: &str) -> DateTime<Utc> {
        self.get(key)
            .and_then(|v| cast::to_time(&v))
            .unwrap_or_default()
    }

    fn get_duration(&self, key: &str) -> Duration {
        self.get(key)
            .and_then(|v| cast::to_duration(&v))
            .unwrap_or_default()
    }
}

/// A `Configurable` that can be populated from somewhere.
#[async_trait]
pub trait Source: Configurable {
    /// Populate the store from its origin. No-op by default.
    async fn load(&self) -> errors::Result<()> {
        Ok(())
    }

    /// `Some` when the source can persist itself.
    fn as_writable(&self) -> Option<&dyn Writable> {
        None
    }

    /// Short label used in log lines.
    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// A `Source` with a persistent destination.
#[async_trait]
pub trait Writable: Source {
    async fn save(&self) -> errors::Result<()>;
}

/// Save `source` if it is writable; otherwise do nothing.
pub async fn save_source(source: &dyn Source) -> errors::Result<()> {
    match source.as_writable() {
        Some(writable) => writable.save().await,
        None => Ok(())
    }
}

/// Forward `Configurable` to a `KeyStore` field.
#[macro_export]
macro_rules! impl_configurable {
    ($ty:ty, $field:ident) => {
        impl $crate::traits::Configurable for $ty {
            fn get(&self, key: &str) -> Option<$crate::types::Value> {
                $crate::traits::Configurable::get(&self.$field, key)
            }

            fn set(&self, key: &str, value: $crate::types::Value) {
                $crate::traits::Configurable::set(&self.$field, key, value)
            }

            fn unset(&self, key: &str) {
                $crate::traits::Configurable::unset(&self.$field, key)
            }

            fn unset_scope(&self, scope: &str) {
                $crate::traits::Configurable::unset_scope(&self.$field, scope)
            }

            fn reset(&self, snapshot: Option<&$crate::types::Snapshot>) {
                $crate::traits::Configurable::reset(&self.$field, snapshot)
            }

            fn all(&self) -> $crate::types::Snapshot {
                $crate::traits::Configurable::all(&self.$field)
            }
        }
    };
}
