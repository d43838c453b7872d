mod common;

use serde_json::Value;

async fn list(app: &common::TestApp, user_id: i32, which: &str) -> Vec<Value> {
    let resp = app
        .client
        .get(app.url(&format!("/users/{}/{}", user_id, which)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["data"].as_array().unwrap().clone()
}

#[tokio::test]
async fn follow_then_unfollow() {
    let app = common::spawn_app().await;
    let (alice_id, _) = common::create_test_user(&app, "alice").await;
    let (bob_id, bob_token) = common::create_test_user(&app, "bob").await;

    // Follow
    let resp = app
        .client
        .post(app.url(&format!("/users/{}/follow", alice_id)))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["following"], true);

    let followers = list(&app, alice_id, "followers").await;
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0]["id"], bob_id);
    assert_eq!(followers[0]["username"], "bob");
    assert!(followers[0].get("email").is_none());

    let following = list(&app, bob_id, "following").await;
    assert_eq!(following.len(), 1);
    assert_eq!(following[0]["id"], alice_id);

    // Unfollow
    let resp = app
        .client
        .delete(app.url(&format!("/users/{}/follow", alice_id)))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["following"], false);

    assert!(list(&app, alice_id, "followers").await.is_empty());
    assert!(list(&app, bob_id, "following").await.is_empty());
}

#[tokio::test]
async fn unfollow_is_idempotent() {
    let app = common::spawn_app().await;
    let (target_id, _) = common::create_test_user(&app, "target").await;
    let (_, token) = common::create_test_user(&app, "stranger").await;

    let resp = app
        .client
        .delete(app.url(&format!("/users/{}/follow", target_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Was not following");
}

#[tokio::test]
async fn cannot_follow_self() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "narcissus").await;

    let resp = app
        .client
        .post(app.url(&format!("/users/{}/follow", user_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn duplicate_follow_rejected() {
    let app = common::spawn_app().await;
    let (target_id, _) = common::create_test_user(&app, "celebrity").await;
    let (_, token) = common::create_test_user(&app, "fan").await;

    let url = app.url(&format!("/users/{}/follow", target_id));
    let resp = app.client.post(&url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app.client.post(&url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(resp.status(), 400);

    assert_eq!(list(&app, target_id, "followers").await.len(), 1);
}

#[tokio::test]
async fn follow_missing_user_not_found() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "lonely").await;

    let resp = app
        .client
        .post(app.url("/users/99999/follow"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn followers_listed_most_recent_first() {
    let app = common::spawn_app().await;
    let (target_id, _) = common::create_test_user(&app, "host").await;
    let (first_id, first_token) = common::create_test_user(&app, "early").await;
    let (second_id, second_token) = common::create_test_user(&app, "late").await;

    for token in [&first_token, &second_token] {
        let resp = app
            .client
            .post(app.url(&format!("/users/{}/follow", target_id)))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let followers = list(&app, target_id, "followers").await;
    assert_eq!(followers.len(), 2);
    assert_eq!(followers[0]["id"], second_id);
    assert_eq!(followers[1]["id"], first_id);
}
