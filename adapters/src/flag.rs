//! # Flag Source
//!
//! Exposes parsed command-line flags as configuration. Flags are captured
//! from `clap::ArgMatches` (or given directly as name/value pairs) and are
//! resolved with the same prefix and namespace rules as environment
//! variables: with prefix `app-` and namespace `postgres`, the flag
//! `app-postgres-host` lands under `postgres.host`.

use async_trait::async_trait;
use clap::ArgMatches;
use strata_core::namespace;
use strata_core::{Configurable, KeyStore, Source, Value};
use tracing::debug;

#[derive(Debug, Default)]
pub struct FlagSource {
    store: KeyStore,
    prefix: String,
    namespaces: Vec<String>,
    flags: Vec<(String, Value)>
}

impl FlagSource {
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

    /// Capture every argument present in `matches`, defaults included.
    ///
    /// Single values are kept as strings; repeated values become a list.
    pub fn with_matches(mut self, matches: &ArgMatches) -> Self {
        self.flags.extend(capture_matches(matches));
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.flags.push((name.into(), value.into()));
        self
    }

    pub fn with_flags<I, K, V>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>
    {
        self.flags
            .extend(flags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn resolve_key(&self, name: &str) -> String {
        namespace::resolve(
            namespace::strip_prefix(name, &self.prefix),
            &self.namespaces
        )
    }
}

fn capture_matches(matches: &ArgMatches) -> Vec<(String, Value)> {
    let mut flags = Vec::new();
    for id in matches.ids() {
        let name = id.as_str();
        let Ok(Some(raw)) = matches.try_get_raw(name) else {
            continue;
        };
        let mut values: Vec<Value> = raw
            .map(|v| Value::String(v.to_string_lossy().into_owned()))
            .collect();
        let value = match values.len() {
            0 => continue,
            1 => values.remove(0),
            _ => Value::List(values)
        };
        flags.push((name.to_string(), value));
    }
    flags
}

strata_core::impl_configurable!(FlagSource, store);

#[async_trait]
impl Source for FlagSource {
    async fn load(&self) -> errors::Result<()> {
        for (name, value) in &self.flags {
            let key = self.resolve_key(name);
            if key.is_empty() {
                continue;
            }
            self.store.set(&key, value.clone());
        }
        debug!(prefix = %self.prefix, flags = self.flags.len(), "Loaded command-line flags");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("flags(prefix={})", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command, value_parser};

    fn command() -> Command {
        Command::new("app")
            .arg(
                Arg::new("test-a")
                    .long("test-a")
                    .default_value("abc")
            )
            .arg(
                Arg::new("postgres-port")
                    .long("postgres-port")
                    .value_parser(value_parser!(u16))
                    .default_value("5432")
            )
            .arg(
                Arg::new("tag")
                    .long("tag")
                    .action(ArgAction::Append)
            )
            .arg(
                Arg::new("verbose")
                    .long("verbose")
                    .action(ArgAction::SetTrue)
            )
    }

    #[tokio::test]
    async fn test_prefix_is_stripped() {
        let matches = command().try_get_matches_from(["app"]).unwrap();
        let source = FlagSource::new("test-").with_matches(&matches);
        source.load().await.unwrap();
        assert_eq!(source.get_string("a"), "abc");
        assert_eq!(source.get("test-a"), None);
    }

    #[tokio::test]
    async fn test_namespace_rewrites_typed_flags() {
        let matches = command()
            .try_get_matches_from(["app", "--postgres-port", "6543"])
            .unwrap();
        let source = FlagSource::new("").with_namespaces(["postgres"]).with_matches(&matches);
        source.load().await.unwrap();
        assert_eq!(source.get_i32("postgres.port"), 6543);
        assert_eq!(source.get("postgres-port"), None);
    }

    #[tokio::test]
    async fn test_repeated_values_become_list() {
        let matches = command()
            .try_get_matches_from(["app", "--tag", "x", "--tag", "y", "--verbose"])
            .unwrap();
        let source = FlagSource::new("").with_matches(&matches);
        source.load().await.unwrap();
        assert_eq!(source.get_i32("tag.length"), 2);
        assert_eq!(source.get_string("tag[1]"), "y");
        assert!(source.get_bool("verbose"));
    }

    #[tokio::test]
    async fn test_explicit_pairs() {
        let source = FlagSource::new("")
            .with_namespaces(["postgres"])
            .with_flag("postgres-host", "localhost")
            .with_flags([("postgres-port", 5432)]);
        source.load().await.unwrap();
        assert_eq!(source.get_string("postgres.host"), "localhost");
        assert_eq!(source.get_i64("postgres.port"), 5432);
        assert_eq!(source.prefix(), "");
    }
}
