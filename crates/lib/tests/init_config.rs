//! Integration test: `init` writes a loadable default config and leaves existing files alone.

use yaddoo::config::{load_config, DEFAULT_API_BASE};
use yaddoo::init::init_config_dir;

#[test]
fn init_creates_default_config() {
    let dir = std::env::temp_dir()
        .join(format!("yaddoo-init-test-{}", uuid::Uuid::new_v4()))
        .join(".yaddoo");
    let config_path = dir.join("config.json");

    let created = init_config_dir(&config_path).expect("init");
    assert_eq!(created, dir);
    assert!(config_path.exists());

    let (config, path) = load_config(Some(config_path.clone())).expect("load");
    assert_eq!(path, config_path);
    assert_eq!(config.api.base_url, DEFAULT_API_BASE);
}

#[test]
fn init_keeps_existing_config() {
    let dir = std::env::temp_dir().join(format!("yaddoo-init-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let config_path = dir.join("config.json");
    std::fs::write(&config_path, r#"{"api":{"baseUrl":"http://pi.local:3000"}}"#).unwrap();

    init_config_dir(&config_path).expect("init");
    let (config, _) = load_config(Some(config_path)).expect("load");
    assert_eq!(config.api.base_url, "http://pi.local:3000");
}

#[test]
fn missing_config_loads_defaults_and_bad_json_errors() {
    let dir = std::env::temp_dir().join(format!("yaddoo-init-test-{}", uuid::Uuid::new_v4()));
    let (config, _) = load_config(Some(dir.join("config.json"))).expect("defaults");
    assert_eq!(config.api.base_url, DEFAULT_API_BASE);

    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.json"), "{oops").unwrap();
    assert!(load_config(Some(dir.join("config.json"))).is_err());
}
