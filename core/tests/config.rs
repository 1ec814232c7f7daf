use relief_core::config::{AppConfig, CONFIG_FILE_NAME, DEFAULT_MODEL};
use relief_core::error::CoreError;
use std::collections::HashMap;
use std::path::PathBuf;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k| map.get(k).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppConfig::resolve_with(env_of(&[]), Some(dir.path().to_path_buf())).unwrap();
    assert_eq!(cfg.model, DEFAULT_MODEL);
    assert_eq!(cfg.data_dir, dir.path());
    assert_eq!(cfg.api_key, None);
    assert_eq!(cfg.search_source, "floodsupport.org");
    assert!(cfg.journal_enabled);
}

#[test]
fn env_overrides_file_and_data_dir_env_wins() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"model":"from-file","search_source":"reliefweb.int","journal_enabled":false}"#,
    )
    .unwrap();

    let data_dir = dir.path().to_string_lossy().to_string();
    let cfg = AppConfig::resolve_with(
        env_of(&[
            ("RELIEF_DATA_DIR", data_dir.as_str()),
            ("API_KEY", "fallback-key"),
            ("RELIEF_MODEL", "from-env"),
        ]),
        Some(PathBuf::from("/ignored")),
    )
    .unwrap();
    assert_eq!(cfg.data_dir, dir.path());
    assert_eq!(cfg.model, "from-env");
    assert_eq!(cfg.search_source, "reliefweb.int");
    assert!(!cfg.journal_enabled);
    assert_eq!(cfg.api_key.as_deref(), Some("fallback-key"));
}

#[test]
fn gemini_key_takes_precedence_and_blank_keys_vanish() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = Some(dir.path().to_path_buf());
    let cfg = AppConfig::resolve_with(
        env_of(&[("GEMINI_API_KEY", "primary"), ("API_KEY", "secondary")]),
        fallback.clone(),
    )
    .unwrap();
    assert_eq!(cfg.api_key.as_deref(), Some("primary"));

    let cfg = AppConfig::resolve_with(env_of(&[("GEMINI_API_KEY", "   ")]), fallback).unwrap();
    assert_eq!(cfg.api_key, None);
}

#[test]
fn plain_http_base_is_rejected_unless_loopback() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = Some(dir.path().to_path_buf());
    let err = AppConfig::resolve_with(
        env_of(&[("RELIEF_API_BASE", "http://gemini.example.com")]),
        fallback.clone(),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));

    let cfg = AppConfig::resolve_with(env_of(&[("RELIEF_API_BASE", "http://127.0.0.1:8089")]), fallback)
        .unwrap();
    assert_eq!(cfg.api_base, "http://127.0.0.1:8089");
}

#[test]
fn broken_config_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ model: ").unwrap();
    let err = AppConfig::resolve_with(env_of(&[]), Some(dir.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));
}

#[test]
fn written_config_omits_the_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = AppConfig::resolve_with(env_of(&[]), Some(dir.path().to_path_buf())).unwrap();
    cfg.api_key = Some("secret".to_string());
    cfg.request_timeout_secs = 15;
    let path = cfg.write_to_data_dir().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("secret"));
    let reread = AppConfig::resolve_with(env_of(&[]), Some(dir.path().to_path_buf())).unwrap();
    assert_eq!(reread.request_timeout_secs, 15);
    assert_eq!(reread.api_key, None);
}
