mod common;

use serde_json::Value;

#[tokio::test]
async fn register_and_login() {
    let app = common::spawn_app().await;

    // Register
    let resp = app
        .client
        .post(app.url("/register"))
        .json(&serde_json::json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert!(body["success"].as_bool().unwrap());
    assert_eq!(body["data"]["user"]["username"], "alice");
    assert!(body["data"]["user"].get("password_hash").is_none());
    assert!(body["data"]["token"].as_str().is_some());

    // Login
    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({
            "email": "alice@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["success"].as_bool().unwrap());
    let token = body["data"]["token"].as_str().unwrap();

    // Get current user
    let resp = app
        .client
        .get(app.url("/me"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn register_duplicate_email_fails() {
    let app = common::spawn_app().await;
    common::create_test_user(&app, "bob").await;

    let resp = app
        .client
        .post(app.url("/register"))
        .json(&serde_json::json!({
            "username": "bob2",
            "email": "bob@test.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn register_duplicate_username_fails() {
    let app = common::spawn_app().await;
    common::create_test_user(&app, "carol").await;

    let resp = app
        .client
        .post(app.url("/register"))
        .json(&serde_json::json!({
            "username": "carol",
            "email": "other@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/register"))
        .json(&serde_json::json!({
            "username": "dave",
            "email": "not-an-email",
            "password": "short"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn login_wrong_password_fails() {
    let app = common::spawn_app().await;
    common::create_test_user(&app, "erin").await;

    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({
            "email": "erin@test.com",
            "password": "wrong_password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn login_unknown_email_fails() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({
            "email": "nobody@example.com",
            "password": "password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn protected_route_requires_token() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/me")).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .get(app.url("/me"))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .post(app.url("/posts"))
        .json(&serde_json::json!({ "title": "t", "body": "b" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn register_accepts_six_character_password() {
    let app = common::spawn_app().await;

    let register = |username: &str, password: &str| {
        app.client
            .post(app.url("/register"))
            .json(&serde_json::json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": password
            }))
            .send()
    };

    let resp = register("frank", "abcdef").await.unwrap();
    assert_eq!(resp.status(), 201);

    let resp = register("grace", "abcde").await.unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn register_without_password_is_bad_request() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/register"))
        .json(&serde_json::json!({
            "username": "heidi",
            "email": "heidi@example.com"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/login"))
        .header("content-type", "application/json")
        .body("{\"email\":")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_with_malformed_email_is_unauthorized() {
    let app = common::spawn_app().await;
    common::create_test_user(&app, "ivan").await;

    let resp = app
        .client
        .post(app.url("/login"))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "password": "test_password_123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
