//! Tests for configuration parsing.

use super::*;

#[test]
fn test_config_default() {
    let config = OfflineCacheConfig::default();
    assert_eq!(config.cache_name, "calculator-pwa-v1");
    assert_eq!(
        config.assets,
        vec!["/", "/index.html", "/app.js", "/manifest.webmanifest"]
    );
    assert_eq!(config.offline_fallback, "/index.html");
    assert_eq!(config.storage.kind, StorageKind::Memory);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_parse_full() {
    let yaml = r#"
origin: "http://static.internal:8081"
cache_name: "calculator-pwa-v2"
assets: ["/", "/app.js"]
offline_fallback: "/offline.html"
storage:
  kind: filesystem
  path: "/var/cache/calc"
"#;
    let config: OfflineCacheConfig = serde_saphyr::from_str(yaml).unwrap();
    assert_eq!(config.origin, "http://static.internal:8081");
    assert_eq!(config.cache_name, "calculator-pwa-v2");
    assert_eq!(config.assets, vec!["/", "/app.js"]);
    assert_eq!(config.offline_fallback, "/offline.html");
    assert_eq!(config.storage.kind, StorageKind::Filesystem);
    assert_eq!(config.storage.path, PathBuf::from("/var/cache/calc"));
}

#[test]
fn test_config_applies_defaults() {
    let yaml = r#"
cache_name: "custom"
"#;
    let config: OfflineCacheConfig = serde_saphyr::from_str(yaml).unwrap();
    assert_eq!(config.cache_name, "custom");
    assert_eq!(config.origin, "http://127.0.0.1:3000"); // default
    assert_eq!(config.assets.len(), 4); // default
    assert_eq!(config.storage, StorageConfig::default());
}

#[test]
fn test_config_reject_unknown_fields() {
    let yaml = r#"
cache_name: "test"
unknown_field: "should fail"
"#;
    let result: Result<OfflineCacheConfig, _> = serde_saphyr::from_str(yaml);
    assert!(
        result.is_err(),
        "Config should reject unknown fields due to deny_unknown_fields"
    );
}

#[test]
fn test_resolve_joins_against_origin() {
    let config = OfflineCacheConfig {
        origin: "http://localhost:9000/app/".to_owned(),
        ..OfflineCacheConfig::default()
    };
    assert_eq!(config.resolve("/").unwrap(), "http://localhost:9000/");
    assert_eq!(
        config.resolve("app.js").unwrap(),
        "http://localhost:9000/app/app.js"
    );
}

#[test]
fn test_validate_rejects_bad_origin() {
    let config = OfflineCacheConfig {
        origin: "ftp://localhost".to_owned(),
        ..OfflineCacheConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(DomainError::InvalidConfig(_))
    ));

    let config = OfflineCacheConfig {
        origin: "not a url".to_owned(),
        ..OfflineCacheConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_empty_cache_name() {
    let config = OfflineCacheConfig {
        cache_name: "  ".to_owned(),
        ..OfflineCacheConfig::default()
    };
    assert!(config.validate().is_err());
}
