use adapters::UrlSource;
use serde_json::json;
use strata_core::{Configurable, Source, Value};
use testing::{config_server, status_server};

#[tokio::test]
async fn test_load_remote_document() {
    let server = config_server(
        "/config.json",
        json!({ "feature": { "enabled": true, "ratio": 0.5 } })
    )
    .await;

    let source = UrlSource::new(format!("{}/config.json", server.uri()));
    source.load().await.unwrap();
    assert!(source.get_bool("feature.enabled"));
    assert_eq!(source.get_f64("feature.ratio"), 0.5);
    assert!(source.as_writable().is_none());
}

#[tokio::test]
async fn test_non_success_status_is_parse_error() {
    let server = status_server("/config.json", 404, "missing").await;

    let source = UrlSource::new(format!("{}/config.json", server.uri()));
    source.set("kept", Value::from(true));
    let err = source.load().await.unwrap_err();
    assert!(err.is_parse(), "unexpected error: {err}");
    assert!(source.get_bool("kept"));
}

#[tokio::test]
async fn test_invalid_body_is_parse_error() {
    let server = status_server("/config.json", 200, "<html></html>").await;

    let err = UrlSource::new(format!("{}/config.json", server.uri()))
        .load()
        .await
        .unwrap_err();
    assert!(err.is_parse());
}

#[tokio::test]
async fn test_unreachable_host_is_io_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let url = format!("http://127.0.0.1:{port}/config.json");

    let err = UrlSource::new(url).load().await.unwrap_err();
    assert!(err.is_io(), "unexpected error: {err}");
}
