mod common;

use agora::models::Comment;
use sea_orm::EntityTrait;
use serde_json::Value;

#[tokio::test]
async fn create_then_fetch_comment_round_trip() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "commenter").await;
    let post_id = common::create_test_post(&app, &token, "Discuss").await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comments", post_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "body": "Nice post" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let comment_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["post_id"], post_id);

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}/comments", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let comments = body["data"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["id"], comment_id);
    assert_eq!(comments[0]["body"], "Nice post");
    assert_eq!(comments[0]["user_id"], user_id);
    assert_eq!(comments[0]["author"]["username"], "commenter");
}

#[tokio::test]
async fn comments_listed_newest_first() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "chatty").await;
    let post_id = common::create_test_post(&app, &token, "Thread").await;

    for text in ["first", "second"] {
        let resp = app
            .client
            .post(app.url(&format!("/posts/{}/comments", post_id)))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "body": text }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}/comments", post_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let comments = body["data"].as_array().unwrap();
    assert_eq!(comments[0]["body"], "second");
    assert_eq!(comments[1]["body"], "first");
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "lost").await;

    let resp = app
        .client
        .post(app.url("/posts/99999/comments"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "body": "Hello?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn empty_comment_rejected() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "silent").await;
    let post_id = common::create_test_post(&app, &token, "Quiet").await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comments", post_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "body": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn update_and_delete_own_comment() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "owner").await;
    let post_id = common::create_test_post(&app, &token, "Post").await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comments", post_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "body": "Draft" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let comment_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .put(app.url(&format!("/comments/{}", comment_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "body": "Final" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["body"], "Final");

    let resp = app
        .client
        .delete(app.url(&format!("/comments/{}", comment_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}/comments", post_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn non_author_cannot_modify_comment() {
    let app = common::spawn_app().await;
    let (_, author_token) = common::create_test_user(&app, "writer").await;
    let (_, other_token) = common::create_test_user(&app, "vandal").await;
    let post_id = common::create_test_post(&app, &author_token, "Post").await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comments", post_id)))
        .bearer_auth(&author_token)
        .json(&serde_json::json!({ "body": "Original" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let comment_id = body["data"]["id"].as_i64().unwrap() as i32;

    let resp = app
        .client
        .put(app.url(&format!("/comments/{}", comment_id)))
        .bearer_auth(&other_token)
        .json(&serde_json::json!({ "body": "Defaced" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .delete(app.url(&format!("/comments/{}", comment_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let stored = Comment::find_by_id(comment_id)
        .one(&app.db)
        .await
        .unwrap()
        .expect("comment should still exist");
    assert_eq!(stored.body, "Original");
}

#[tokio::test]
async fn deleting_post_removes_its_comments() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "cleaner").await;
    let post_id = common::create_test_post(&app, &token, "Temporary").await;

    let resp = app
        .client
        .post(app.url(&format!("/posts/{}/comments", post_id)))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "body": "Soon gone" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let comment_id = body["data"]["id"].as_i64().unwrap() as i32;

    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let stored = Comment::find_by_id(comment_id).one(&app.db).await.unwrap();
    assert!(stored.is_none());
}
