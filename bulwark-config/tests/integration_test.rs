//! Integration tests for bulwark-config

use bulwark_config::*;
use std::io::Write;

#[test]
fn test_load_dotenv_file_with_prefix() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "BULWARK_IT_9C1E_CSRF_SECRET=from-dotenv").unwrap();
    writeln!(file, "BULWARK_IT_9C1E_CSRF_COOKIE_SECURE=false").unwrap();

    let manager = ConfigManager::with_prefix("BULWARK_IT_9C1E");
    manager
        .load_dotenv(Some(file.path().to_str().unwrap()))
        .unwrap();

    assert_eq!(manager.get_string("csrf_secret").unwrap(), "from-dotenv");
    assert!(!manager.get_bool("csrf_cookie_secure").unwrap());
}

#[test]
fn test_load_dotenv_missing_file_is_error() {
    let manager = ConfigManager::new();
    let result = manager.load_dotenv(Some("/definitely/not/here/.env"));
    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[test]
fn test_load_env_with_unused_prefix_is_empty() {
    let manager = ConfigManager::with_prefix("BULWARK_UNUSED_PREFIX_4410");
    manager.load_env().unwrap();
    assert!(manager.keys().is_empty());
}
