use repo_corpus::load_config::load_config;
use serial_test::serial;
use std::fs::write;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

/// A complete config file maps onto crawl settings and analyzer options.
#[tokio::test]
#[serial]
async fn test_load_config_full_file() {
    let file = config_file(
        r#"
host:
  api_base_url: https://ghe.example.com/api/v3/
  reference: develop
crawl:
  trivial_entry_threshold: 2
  max_depth: 10
  max_in_flight_fetches: 4
  low_value_suffixes: [".lock", ".json"]
  repository_marker: "codeRepository"
  retry:
    max_attempts: 5
    base_delay_ms: 100
    max_delay_ms: 1000
analyzer:
  base_url: http://localhost:11434/v1
  model: llama3
  temperature: 0.0
  chunk_chars: 5000
  chunk_overlap_chars: 50
  max_in_flight: 3
"#,
    );

    let config = load_config(file.path()).expect("Config should load");
    let settings = config.crawl_settings();

    assert_eq!(settings.api_base_url, "https://ghe.example.com/api/v3");
    assert_eq!(settings.reference.as_deref(), Some("develop"));
    assert_eq!(settings.trivial_entry_threshold, 2);
    assert_eq!(settings.max_depth, 10);
    assert_eq!(settings.max_in_flight_fetches, 4);
    assert_eq!(settings.low_value_suffixes, vec![".lock", ".json"]);
    assert_eq!(settings.repository_marker, "codeRepository");
    assert_eq!(settings.retry.max_attempts, 5);
    assert_eq!(config.analyzer.model, "llama3");
    assert_eq!(config.analyzer.chunk_chars, 5000);
    assert_eq!(config.analyzer.chunk_overlap_chars, 50);
    assert_eq!(settings.max_in_flight_analyses, 3);
    assert_eq!(settings.max_in_flight_fetches, 4);
}

/// Missing sections and keys fall back to defaults.
#[tokio::test]
#[serial]
async fn test_load_config_partial_and_empty_files_use_defaults() {
    let partial = config_file("crawl:\n  max_in_flight_fetches: 2\n");
    let config = load_config(partial.path()).expect("partial config loads");
    let settings = config.crawl_settings();
    assert_eq!(settings.max_in_flight_fetches, 2);
    assert_eq!(settings.trivial_entry_threshold, 5);
    assert_eq!(settings.reference.as_deref(), Some("main"));
    assert_eq!(settings.repository_marker, "name codeRepository");

    let empty = config_file("");
    let config = load_config(empty.path()).expect("empty config loads");
    assert_eq!(config.crawl_settings().max_depth, 64);
    assert_eq!(config.analyzer.model, "gpt-4o-mini");
    assert_eq!(config.crawl_settings().max_in_flight_analyses, 2);
}

/// `reference: null` asks for each repository's default branch.
#[tokio::test]
#[serial]
async fn test_load_config_null_reference() {
    let file = config_file("host:\n  reference: null\n");
    let config = load_config(file.path()).unwrap();
    assert!(config.crawl_settings().reference.is_none());
}

#[tokio::test]
#[serial]
async fn test_load_config_errors_for_invalid_file() {
    let file = config_file("crawl: [this is: not valid");
    let err = load_config(file.path()).unwrap_err();
    assert!(
        err.to_string().contains("parse"),
        "Should mention parse error, got: {err}"
    );
}

#[tokio::test]
#[serial]
async fn test_load_config_rejects_unusable_values() {
    let zero_fetches = config_file("crawl:\n  max_in_flight_fetches: 0\n");
    let err = load_config(zero_fetches.path()).unwrap_err();
    assert!(err.to_string().contains("max_in_flight_fetches"));

    let zero_attempts = config_file("crawl:\n  retry:\n    max_attempts: 0\n");
    let err = load_config(zero_attempts.path()).unwrap_err();
    assert!(err.to_string().contains("max_attempts"));

    let overlap = config_file("analyzer:\n  chunk_chars: 100\n  chunk_overlap_chars: 100\n");
    let err = load_config(overlap.path()).unwrap_err();
    assert!(err.to_string().contains("chunk_overlap_chars"));

    let no_marker = config_file("crawl:\n  repository_marker: \"  \"\n");
    assert!(load_config(no_marker.path()).is_err());
}

#[tokio::test]
#[serial]
async fn test_load_config_errors_for_missing_file() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
