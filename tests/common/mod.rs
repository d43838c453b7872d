#![allow(dead_code)]

use agora::config::database::{connect, DatabaseConfig};
use reqwest::Client;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();

fn init_env() {
    INIT.call_once(|| {
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        let config = agora::config::jwt::JwtConfig::from_env().unwrap();
        let _ = agora::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.addr, path)
    }
}

static DB_FILES: AtomicU32 = AtomicU32::new(0);

/// On-disk SQLite database removed when dropped.
pub struct DbFile(PathBuf);

impl Drop for DbFile {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.0.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Serve the real router on a random port, backed by a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(DatabaseConfig::in_memory()).await
}

/// Like `spawn_app`, but on a database file with a pool of `max_connections`,
/// so transactions from concurrent requests really interleave.
pub async fn spawn_pooled_app(max_connections: u32) -> (TestApp, DbFile) {
    let path = std::env::temp_dir().join(format!(
        "agora-test-{}-{}.db",
        std::process::id(),
        DB_FILES.fetch_add(1, Ordering::Relaxed)
    ));
    let file = DbFile(path);

    let mut config = DatabaseConfig::in_memory();
    config.url = format!("sqlite://{}?mode=rwc", file.0.display());
    config.max_connections = max_connections;

    (spawn_app_with(config).await, file)
}

pub async fn spawn_app_with(config: DatabaseConfig) -> TestApp {
    init_env();

    let db = connect(&config)
        .await
        .expect("Failed to open test database");

    agora::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(agora::routes::create_routes())
        .layer(axum::extract::Extension(db.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
    }
}

/// Register a user and return (user_id, token).
pub async fn create_test_user(app: &TestApp, username: &str) -> (i32, String) {
    let resp = app
        .client
        .post(app.url("/register"))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@test.com", username),
            "password": "test_password_123"
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse register response");
    assert_eq!(
        status, 201,
        "Failed to register user '{}': body={}",
        username, body
    );

    let user_id = body["data"]["user"]["id"]
        .as_i64()
        .expect("Response missing user id") as i32;
    let token = body["data"]["token"]
        .as_str()
        .expect("Response missing token")
        .to_string();
    (user_id, token)
}

/// Create a post as the token's owner and return its id.
pub async fn create_test_post(app: &TestApp, token: &str, title: &str) -> i32 {
    let resp = app
        .client
        .post(app.url("/posts"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "title": title,
            "body": "Test body"
        }))
        .send()
        .await
        .expect("Failed to create post");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse post response");
    assert_eq!(status, 201, "Failed to create post: body={}", body);

    body["data"]["id"].as_i64().expect("Post response missing id") as i32
}

/// Submit a vote and return the response body.
pub async fn vote(app: &TestApp, token: &str, post_id: i32, direction: i16) -> (u16, Value) {
    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/vote", post_id)))
        .bearer_auth(token)
        .json(&serde_json::json!({ "direction": direction }))
        .send()
        .await
        .expect("Failed to vote");

    let status = resp.status().as_u16();
    let body: Value = resp.json().await.expect("Failed to parse vote response");
    (status, body)
}
