//! # URL Source
//!
//! Fetches a JSON document over HTTP(S) with a GET request and flattens it.
//! Read-only: there is no way to push configuration back.

use async_trait::async_trait;
use errors::ConfigError;
use strata_core::flatten::flatten_root;
use strata_core::{Configurable, KeyStore, Source, Value};
use tracing::info;

#[derive(Debug)]
pub struct UrlSource {
    store: KeyStore,
    url: String,
    client: reqwest::Client
}

impl UrlSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Use a preconfigured client (timeouts, proxies, TLS roots).
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            store: KeyStore::new(),
            url: url.into(),
            client
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

strata_core::impl_configurable!(UrlSource, store);

#[async_trait]
impl Source for UrlSource {
    /// Transport failures are `Io`; non-2xx statuses and unusable bodies are
    /// `Parse`. On any error the store is left untouched.
    async fn load(&self) -> errors::Result<()> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ConfigError::io(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigError::parse(
                &self.url,
                format!("unexpected status {status}")
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ConfigError::io(&self.url, e))?;
        let document = Value::from_json_slice(&body).map_err(|e| ConfigError::parse(&self.url, e))?;
        let flat = flatten_root(&document, &self.url)?;

        self.store.reset(Some(&flat));
        info!(url = %self.url, keys = flat.len(), "Loaded remote configuration");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("url({})", self.url)
    }
}
