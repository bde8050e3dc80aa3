use std::collections::HashMap;

use uuid::Uuid;

use super::*;
use crate::services::challenge::Difficulty;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

fn write_temp(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sketchroom-catalog-{}.yaml", Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn empty_environment_yields_defaults() {
    let config = SessionConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(config.database_url, "sqlite://chat.db");
    assert_eq!(config.db_max_connections, 5);
    assert_eq!((config.initial_width, config.initial_height), (1400, 800));
    assert_eq!(config.bounds, ResizeBounds { min: 100, max: 5000 });
    assert_eq!(config.catalog.len(), 3);
    assert_eq!(config.palettes.names().len(), 4);
}

#[test]
fn numeric_overrides_are_parsed() {
    let config = SessionConfig::from_lookup(lookup_from(&[
        (ENV_CANVAS_WIDTH, "800"),
        (ENV_CANVAS_HEIGHT, " 600 "),
        (ENV_CANVAS_MIN, "50"),
        (ENV_CANVAS_MAX, "2000"),
        (ENV_DATABASE_URL, "sqlite://other.db"),
    ]))
    .unwrap();
    assert_eq!((config.initial_width, config.initial_height), (800, 600));
    assert_eq!(config.bounds, ResizeBounds { min: 50, max: 2000 });
    assert_eq!(config.database_url, "sqlite://other.db");
}

#[test]
fn invalid_numbers_fall_back_to_defaults() {
    let config = SessionConfig::from_lookup(lookup_from(&[
        (ENV_CANVAS_WIDTH, "wide"),
        (ENV_DB_MAX_CONNECTIONS, "-3"),
    ]))
    .unwrap();
    assert_eq!(config.initial_width, 1400);
    assert_eq!(config.db_max_connections, 5);
}

#[test]
fn initial_size_is_clamped_into_bounds() {
    let config = SessionConfig::from_lookup(lookup_from(&[(ENV_CANVAS_WIDTH, "9000"), (ENV_CANVAS_HEIGHT, "5")]))
        .unwrap();
    assert_eq!((config.initial_width, config.initial_height), (5000, 100));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn inverted_bounds_are_rejected() {
    let err = SessionConfig::from_lookup(lookup_from(&[(ENV_CANVAS_MIN, "600"), (ENV_CANVAS_MAX, "500")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBounds { min: 600, max: 500 }));
}

#[test]
fn zero_min_bound_is_rejected() {
    let err = SessionConfig::from_lookup(lookup_from(&[(ENV_CANVAS_MIN, "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBounds { .. }));
}

#[test]
fn empty_catalog_and_zero_duration_are_rejected() {
    let config = SessionConfig { catalog: Vec::new(), ..SessionConfig::default() };
    assert!(matches!(config.validate(), Err(ConfigError::EmptyCatalog)));

    let config = SessionConfig {
        catalog: vec![Challenge::new("Blink", 0, &[], Difficulty::Easy)],
        ..SessionConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::ZeroDuration(p)) if p == "Blink"));
}

#[test]
fn catalog_without_usable_palette_is_rejected() {
    let path = write_temp("palettes:\n  - name: Words\n    colors: [red, blue]\n");
    let path_str = path.display().to_string();
    let result = SessionConfig::from_lookup(lookup_from(&[(ENV_CATALOG_PATH, &path_str)]));
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(ConfigError::EmptyPalettes)));
}

// =============================================================================
// Catalog file
// =============================================================================

#[test]
fn catalog_file_overrides_present_sections_only() {
    let path = write_temp(
        r##"
challenges:
  - prompt: Sketch a lighthouse
    duration_secs: 120
    required_elements: [tower, light]
    difficulty: Easy
palettes:
  - name: Mono
    colors: ["#000000", "#ffffff"]
"##,
    );
    let path_str = path.display().to_string();
    let result = SessionConfig::from_lookup(lookup_from(&[(ENV_CATALOG_PATH, &path_str)]));
    std::fs::remove_file(&path).unwrap();
    let config = result.unwrap();

    assert_eq!(config.catalog.len(), 1);
    assert_eq!(config.catalog[0].label(), "Sketch a lighthouse (Easy)");
    assert_eq!(config.palettes.color("Mono", 1), Some("#FFFFFF"));
    assert_eq!(config.music.mood_names(), vec!["Calm", "Energetic", "Focus"]);
}

#[test]
fn missing_catalog_file_is_io_error() {
    let err = SessionConfig::from_lookup(lookup_from(&[(ENV_CATALOG_PATH, "/nonexistent/sketchroom.yaml")]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn malformed_catalog_file_is_yaml_error() {
    let path = write_temp("challenges: [ { prompt: 3 ");
    let err = load_catalog_file(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(err, ConfigError::Yaml { .. }));
}

#[test]
fn unknown_catalog_sections_are_rejected() {
    let path = write_temp("stickers: []\n");
    let err = load_catalog_file(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(err, ConfigError::Yaml { .. }));
}
