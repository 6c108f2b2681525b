use bricklink_backup::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use bricklink_backup::load_config::load_config;
use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

const ENV_VARS: [&str; 4] = [
    "BRICKLINK_CONSUMER_KEY",
    "BRICKLINK_CONSUMER_SECRET",
    "BRICKLINK_TOKEN_VALUE",
    "BRICKLINK_TOKEN_SECRET",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn config_file(contents: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), contents).unwrap();
    file
}

const FULL_CONFIG: &str = r#"
[API]
CONSUMER_KEY = "consumer-key"
CONSUMER_SECRET = "consumer-secret"
TOKEN_VALUE = "token-value"
TOKEN_SECRET = "token-secret"

[EXPORT]
PATH = "./tmp/backups"
"#;

#[test]
#[serial]
fn test_load_config_success_with_defaults() {
    clear_env();
    let file = config_file(FULL_CONFIG);

    let config = load_config(file.path()).expect("Config should load");

    assert_eq!(config.credentials.consumer_key, "consumer-key");
    assert_eq!(config.credentials.consumer_secret, "consumer-secret");
    assert_eq!(config.credentials.token_value, "token-value");
    assert_eq!(config.credentials.token_secret, "token-secret");
    assert_eq!(config.output_dir, PathBuf::from("./tmp/backups"));
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    assert!(config.inventory_ids.is_empty());
}

#[test]
#[serial]
fn test_load_config_reads_optional_settings() {
    clear_env();
    let file = config_file(
        r#"
[API]
CONSUMER_KEY = "a"
CONSUMER_SECRET = "b"
TOKEN_VALUE = "c"
TOKEN_SECRET = "d"
INVENTORIES = [101, 202]
BASE_URL = "http://localhost:8080/api"
TIMEOUT_SECS = 5

[EXPORT]
PATH = "out"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.inventory_ids, vec![101, 202]);
    assert_eq!(config.base_url, "http://localhost:8080/api");
    assert_eq!(config.timeout, Duration::from_secs(5));
}

#[test]
#[serial]
fn test_load_config_env_overrides_file_credentials() {
    clear_env();
    env::set_var("BRICKLINK_TOKEN_SECRET", "from-env");
    let file = config_file(FULL_CONFIG);

    let config = load_config(file.path()).unwrap();
    clear_env();

    assert_eq!(config.credentials.token_secret, "from-env");
    assert_eq!(config.credentials.consumer_key, "consumer-key");
}

#[test]
#[serial]
fn test_load_config_env_supplies_credentials_missing_from_file() {
    clear_env();
    for var in ENV_VARS {
        env::set_var(var, "secret");
    }
    let file = config_file("[API]\n\n[EXPORT]\nPATH = \"out\"\n");

    let config = load_config(file.path());
    clear_env();

    assert_eq!(config.unwrap().credentials.consumer_secret, "secret");
}

#[test]
#[serial]
fn test_load_config_errors_on_empty_credential() {
    clear_env();
    let file = config_file(&FULL_CONFIG.replace("\"token-value\"", "\"  \""));

    let msg = load_config(file.path()).unwrap_err().to_string();

    assert!(msg.contains("Missing configuration data"), "got: {msg}");
    assert!(msg.contains("TOKEN_VALUE"), "got: {msg}");
}

#[test]
#[serial]
fn test_load_config_errors_on_empty_export_path() {
    clear_env();
    let file = config_file(&FULL_CONFIG.replace("./tmp/backups", ""));

    let msg = load_config(file.path()).unwrap_err().to_string();

    assert!(msg.contains("EXPORT.PATH"), "got: {msg}");
}

#[test]
#[serial]
fn test_load_config_errors_on_zero_timeout() {
    clear_env();
    let file = config_file(&FULL_CONFIG.replace("[EXPORT]", "TIMEOUT_SECS = 0\n\n[EXPORT]"));

    let msg = load_config(file.path()).unwrap_err().to_string();

    assert!(msg.contains("TIMEOUT_SECS"), "got: {msg}");
}

#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    clear_env();
    let file = config_file("not-toml = [:::");

    let msg = load_config(file.path()).unwrap_err().to_string();

    assert!(msg.contains("parse") || msg.contains("TOML"), "got: {msg}");
}

#[test]
#[serial]
fn test_load_config_errors_for_missing_file() {
    let msg = load_config("/definitely/not/here/config.toml")
        .unwrap_err()
        .to_string();

    assert!(msg.contains("Failed to read config file"), "got: {msg}");
}
