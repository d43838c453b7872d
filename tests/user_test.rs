mod common;

use agora::models::User;
use sea_orm::EntityTrait;
use serde_json::Value;

#[tokio::test]
async fn get_user_profile() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "profiled").await;
    let (_, fan_token) = common::create_test_user(&app, "admirer").await;

    common::create_test_post(&app, &token, "About me").await;
    let resp = app
        .client
        .post(app.url(&format!("/users/{}/follow", user_id)))
        .bearer_auth(&fan_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/users/{}", user_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let data = &body["data"];
    assert_eq!(data["user"]["id"], user_id);
    assert_eq!(data["user"]["username"], "profiled");
    assert!(data["user"].get("email").is_none());
    assert_eq!(data["posts"].as_array().unwrap().len(), 1);
    assert_eq!(data["posts"][0]["title"], "About me");
    assert_eq!(data["follower_count"], 1);
    assert_eq!(data["following_count"], 0);
}

#[tokio::test]
async fn get_missing_user_not_found() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/users/99999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn update_own_username() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "oldname").await;

    let resp = app
        .client
        .put(app.url(&format!("/users/{}", user_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "username": "newname" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["username"], "newname");
}

#[tokio::test]
async fn cannot_update_someone_else() {
    let app = common::spawn_app().await;
    let (victim_id, _) = common::create_test_user(&app, "victim").await;
    let (_, token) = common::create_test_user(&app, "mallory").await;

    let resp = app
        .client
        .put(app.url(&format!("/users/{}", victim_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "username": "pwned" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let stored = User::find_by_id(victim_id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.username, "victim");
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = common::spawn_app().await;
    common::create_test_user(&app, "taken").await;
    let (user_id, token) = common::create_test_user(&app, "hopeful").await;

    let resp = app
        .client
        .put(app.url(&format!("/users/{}", user_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "username": "taken" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn update_missing_user_not_found() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "searcher").await;

    let resp = app
        .client
        .put(app.url("/users/99999"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "username": "whoever" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
