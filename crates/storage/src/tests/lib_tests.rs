use super::*;

#[tokio::test]
async fn stores_and_loads_token() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .store_token("token", "opaque-credential")
        .await
        .expect("store");
    let loaded = storage.load_token("token").await.expect("load");
    assert_eq!(loaded.as_deref(), Some("opaque-credential"));
}

#[tokio::test]
async fn load_returns_none_for_missing_name() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let loaded = storage.load_token("token").await.expect("load");
    assert_eq!(loaded, None);
}

#[tokio::test]
async fn store_overwrites_existing_token() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.store_token("token", "first").await.expect("store");
    storage.store_token("token", "second").await.expect("store");
    let loaded = storage.load_token("token").await.expect("load");
    assert_eq!(loaded.as_deref(), Some("second"));
}

#[tokio::test]
async fn clear_removes_token() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.store_token("token", "opaque").await.expect("store");
    storage.clear_token("token").await.expect("clear");
    let loaded = storage.load_token("token").await.expect("load");
    assert_eq!(loaded, None);
}

#[tokio::test]
async fn clear_is_a_noop_for_missing_name() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.clear_token("token").await.expect("clear");
}

#[tokio::test]
async fn record_carries_storage_timestamp() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let before = Utc::now();
    storage.store_token("token", "opaque").await.expect("store");
    let record = storage
        .load_token_record("token")
        .await
        .expect("load")
        .expect("record exists");
    assert_eq!(record.name, "token");
    assert_eq!(record.token, "opaque");
    assert!(record.stored_at >= before);
    assert!(record.stored_at <= Utc::now());
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("storefront_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("auth.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    storage.store_token("token", "persisted").await.expect("store");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}
