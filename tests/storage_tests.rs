//! File-backed session persistence tests

use caseguard::auth::{FileTokenStore, LogNavigator, MemoryTokenStore, SessionState, TokenStore};
use caseguard::config::{load_config_from_path, Config};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use std::fs;
use std::sync::Arc;

fn mint(name: &str) -> String {
    encode(
        &Header::default(),
        &json!({"nameidentifier": "7", "name": name, "exp": chrono::Utc::now().timestamp() + 3600}),
        &EncodingKey::from_secret(b"issued-by-the-backend"),
    )
    .expect("Failed to mint token")
}

fn config_in(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.storage.dir = dir.join("storage");
    config
}

fn open(config: &Config) -> SessionState {
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::from_config(config));
    SessionState::from_config(config, store, Arc::new(LogNavigator))
}

#[test]
fn test_session_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    open(&config).apply_login(&mint("Dana"));

    let reloaded = open(&config);
    assert_eq!(reloaded.current_identity().unwrap().user_name, "Dana");
    assert!(config.token_path().exists());
}

#[test]
fn test_logout_removes_token_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let session = open(&config);

    session.apply_login(&mint("Dana"));
    session.apply_logout();
    session.apply_logout();

    assert!(!config.token_path().exists());
    assert!(open(&config).current_identity().is_none());
}

#[test]
fn test_token_stored_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let token = mint("Dana");

    open(&config).apply_login(&token);
    assert_eq!(fs::read_to_string(config.token_path()).unwrap(), token);
}

#[test]
fn test_unavailable_storage_reads_as_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let mut config = Config::default();
    config.storage.dir = blocker;
    let session = open(&config);
    assert!(session.current_identity().is_none());

    // Write is best effort; identity still reflects the token handed in
    session.apply_login(&mint("Dana"));
    assert_eq!(session.current_identity().unwrap().user_name, "Dana");
    session.refresh();
    assert!(session.current_identity().is_none());
}

#[test]
fn test_config_file_drives_storage_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caseguard.toml");
    let storage = dir.path().join("store");
    fs::write(
        &path,
        format!(
            "[storage]\ndir = {:?}\ntoken_key = \"auth_token\"\n",
            storage.display().to_string()
        ),
    )
    .unwrap();

    let config = load_config_from_path(&path).unwrap();
    open(&config).apply_login(&mint("Dana"));
    assert!(storage.join("auth_token").exists());
}

fn assert_store_contract(store: &dyn TokenStore) {
    assert_eq!(store.current(), None);

    store.save("a.b.c");
    assert_eq!(store.current().as_deref(), Some("a.b.c"));

    store.save("");
    assert_eq!(store.current(), None);

    store.save("d.e.f");
    store.clear();
    store.clear();
    assert_eq!(store.current(), None);
}

#[test]
fn test_stores_share_one_contract() {
    let dir = tempfile::tempdir().unwrap();
    let file = FileTokenStore::new(dir.path(), "token");
    let memory = MemoryTokenStore::new();

    assert_store_contract(&file);
    assert_store_contract(&memory);
}

#[test]
fn test_empty_save_agrees_across_stores() {
    let dir = tempfile::tempdir().unwrap();
    let file = FileTokenStore::new(dir.path(), "token");
    let memory = MemoryTokenStore::with_token("a.b.c");
    file.save("a.b.c");

    file.save("");
    memory.save("");
    assert_eq!(file.current(), memory.current());
    assert!(!file.path().exists());
}
