use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A temp directory holding JSON configuration files. Removed on drop.
pub struct JsonFixture {
    dir: TempDir
}

impl JsonFixture {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?
        })
    }

    /// Path of `name` inside the fixture directory; the file may not exist.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `document` as `name` and return its path.
    pub fn write(&self, name: &str, document: &Value) -> std::io::Result<PathBuf> {
        let target = self.path(name);
        let body = serde_json::to_vec_pretty(document)?;
        std::fs::write(&target, body)?;
        tracing::debug!(path = %target.display(), "Wrote JSON fixture");
        Ok(target)
    }

    /// Write raw bytes, for malformed documents.
    pub fn write_raw(&self, name: &str, body: &str) -> std::io::Result<PathBuf> {
        let target = self.path(name);
        std::fs::write(&target, body)?;
        Ok(target)
    }

    pub fn read(&self, name: &str) -> std::io::Result<Value> {
        let body = std::fs::read(self.path(name))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Start a mock server that answers `GET route` with `document`.
pub async fn config_server(route: &str, document: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(document))
        .mount(&server)
        .await;
    server
}

/// Start a mock server that answers `GET route` with `status` and `body`.
pub async fn status_server(route: &str, status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}
