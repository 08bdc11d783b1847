use adapters::EnvSource;
use serial_test::serial;
use std::env;
use strata_core::{Configurable, Source};

fn set_vars(vars: &[(&str, &str)]) {
    for (k, v) in vars {
        unsafe { env::set_var(k, v) };
    }
}

fn clear_vars(vars: &[(&str, &str)]) {
    for (k, _) in vars {
        unsafe { env::remove_var(k) };
    }
}

#[tokio::test]
#[serial]
async fn test_process_env_is_read() {
    let vars = [("STRATA_ENV_TEST_VALUE", "abc")];
    set_vars(&vars);

    let source = EnvSource::new("");
    source.load().await.unwrap();
    assert_eq!(source.get_string("STRATA_ENV_TEST_VALUE"), "abc");
    assert_eq!(source.get_string("strata_env_test_value"), "abc");

    clear_vars(&vars);
}

#[tokio::test]
#[serial]
async fn test_namespace_separators() {
    let vars = [
        ("STRATANS_HOST", "underscore"),
        ("STRATANS-PORT", "5432"),
        ("STRATANS:USER", "colon")
    ];
    set_vars(&vars);

    let source = EnvSource::new("").with_namespaces(["stratans"]);
    source.load().await.unwrap();
    assert_eq!(source.get_string("stratans.host"), "underscore");
    assert_eq!(source.get_i32("stratans.port"), 5432);
    assert_eq!(source.get_string("stratans.user"), "colon");

    clear_vars(&vars);
}

#[tokio::test]
#[serial]
async fn test_uppercase_namespace_is_normalized() {
    let vars = [("STRATAUP_HOST", "db")];
    set_vars(&vars);

    let source = EnvSource::new("").with_namespaces(["STRATAUP"]);
    source.load().await.unwrap();
    assert_eq!(source.get_string("strataup.host"), "db");
    assert_eq!(source.get("strataup_host"), None);

    clear_vars(&vars);
}

#[tokio::test]
#[serial]
async fn test_prefix_stripped_then_namespaced() {
    let vars = [("MYAPP_DB_HOST", "db"), ("MYAPP_DEBUG", "true")];
    set_vars(&vars);

    let source = EnvSource::new("MYAPP_").with_namespaces(["db"]);
    source.load().await.unwrap();
    assert_eq!(source.get_string("db.host"), "db");
    assert!(source.get_bool("debug"));
    assert_eq!(source.describe(), "env(prefix=MYAPP_)");

    clear_vars(&vars);
}

#[tokio::test]
#[serial]
async fn test_reload_merges() {
    let vars = [("STRATA_MERGE_A", "1")];
    set_vars(&vars);

    let source = EnvSource::new("STRATA_MERGE_");
    source.set("manual", "kept".into());
    source.load().await.unwrap();
    source.load().await.unwrap();
    assert_eq!(source.get_i32("a"), 1);
    assert_eq!(source.get_string("manual"), "kept");

    clear_vars(&vars);
}
