use super::*;
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_when_only_home_is_set() {
    let config = ConsoleConfig::from_lookup(lookup(&[("HOME", "/home/op")])).unwrap();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.auth_timeout_ms, 7000);
    assert_eq!(config.connect_timeout_secs, 10);
    assert_eq!(config.storage_path, PathBuf::from("/home/op/.playerdesk/storage.json"));
    assert_eq!(config.cookie, None);
}

#[test]
fn explicit_values_override_defaults() {
    let config = ConsoleConfig::from_lookup(lookup(&[
        ("PLAYERDESK_BASE_URL", "http://65.0.20.31:3000/"),
        ("PLAYERDESK_TIMEOUT_MS", "250"),
        ("PLAYERDESK_CONNECT_TIMEOUT_SECS", "3"),
        ("PLAYERDESK_STORAGE", "/tmp/desk.json"),
        ("PLAYERDESK_COOKIE", "sid=1"),
    ]))
    .unwrap();
    assert_eq!(config.base_url, "http://65.0.20.31:3000");
    assert_eq!(config.auth_timeout(), Duration::from_millis(250));
    assert_eq!(config.connect_timeout(), Duration::from_secs(3));
    assert_eq!(config.storage_path, PathBuf::from("/tmp/desk.json"));
    assert_eq!(config.cookie.as_deref(), Some("sid=1"));
}

#[test]
fn invalid_timeout_is_rejected() {
    let err = ConsoleConfig::from_lookup(lookup(&[("HOME", "/h"), ("PLAYERDESK_TIMEOUT_MS", "soon")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidNumber { var: "PLAYERDESK_TIMEOUT_MS", .. }));
}

#[test]
fn missing_home_and_storage_is_rejected() {
    let err = ConsoleConfig::from_lookup(lookup(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::NoStorageLocation));
}

#[test]
fn base_url_must_be_http() {
    assert!(normalize_base_url("ftp://example.com").is_err());
    assert!(normalize_base_url("not a url").is_err());
    assert_eq!(normalize_base_url("https://api.example.com//").unwrap(), "https://api.example.com");
}
