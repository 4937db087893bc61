//! Shared test harness: spins the real server on a loopback port so the
//! managers are exercised against the actual wire contract, not a mock.
//! Tests that need failure injection or timing control build their own
//! inline axum routers instead.

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::Mutex;

use draftboard_api::{ApiClient, ApiConfig};
use draftboard_server::{build_router, AppState, ServerConfig, UploadStore};
use draftboard_shared::User;
use draftboard_store::Database;

pub const TEST_TOKEN: &str = "test-token";

pub struct TestStore {
    pub base_url: String,
    state: AppState,
    _uploads: TempDir,
}

/// Boot a server on `127.0.0.1:0` backed by an in-memory database.
/// Nothing is seeded; each test plants exactly the records it needs.
pub async fn spawn_store() -> TestStore {
    let uploads_dir = TempDir::new().unwrap();

    // Bind first so the public URL can carry the real port.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let config = ServerConfig {
        http_addr: addr,
        db_path: None,
        upload_dir: uploads_dir.path().to_path_buf(),
        api_token: TEST_TOKEN.to_string(),
        public_url: base_url.clone(),
        admin_name: "Admin".to_string(),
        admin_role: "Lead Designer".to_string(),
        max_upload_bytes: 1024 * 1024,
    };
    let state = AppState {
        db: Arc::new(Mutex::new(Database::open_in_memory().unwrap())),
        uploads: UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes)
            .await
            .unwrap(),
        config: Arc::new(config),
    };

    let app = build_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestStore {
        base_url,
        state,
        _uploads: uploads_dir,
    }
}

impl TestStore {
    /// An API client pointed at this store.
    pub fn client(&self) -> Arc<ApiClient> {
        Arc::new(ApiClient::new(&ApiConfig::new(&self.base_url, TEST_TOKEN)).unwrap())
    }

    /// Plant a record directly in the backing database.
    pub async fn put(&self, key: &str, value: Value) {
        self.state.db.lock().await.kv_set(key, &value).unwrap();
    }

    /// Read a record directly from the backing database.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.state.db.lock().await.kv_get(key).unwrap()
    }
}

pub async fn seed_user(store: &TestStore, id: &str, name: &str, pin: Option<&str>) {
    let mut user = json!({
        "id": id,
        "name": name,
        "role": "Engineer",
        "requiresPin": true,
    });
    if let Some(pin) = pin {
        user["pin"] = json!(pin);
    }
    store.put(&format!("user:{id}"), user).await;
}

pub async fn seed_log(store: &TestStore, id: &str, user_id: &str, date: &str) {
    store
        .put(
            &format!("log:{id}"),
            json!({
                "id": id,
                "title": format!("Log {id}"),
                "description": "Notes",
                "date": date,
                "category": "UX",
                "userId": user_id,
            }),
        )
        .await;
}

/// A signed-in identity for driving the managers directly.
pub fn test_identity(id: &str) -> User {
    User {
        id: id.to_string(),
        name: "Ada".to_string(),
        role: "Engineer".to_string(),
        pin: None,
        requires_pin: true,
        accessible_tabs: None,
    }
}
