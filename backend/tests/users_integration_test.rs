//! Integration tests for the user directory endpoints

mod common;

use axum::http::StatusCode;
use common::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn test_list_users_requires_token() {
    let app = TestApp::new();

    let response = app.get("/users", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_users_paginates() {
    let app = TestApp::new();
    let (first_id, token) = app.create_test_user().await;
    for _ in 0..4 {
        app.create_test_user().await;
    }

    let all = app.get("/users", Some(&token)).await;
    assert_eq!(all.status, StatusCode::OK);
    let all = all.json();
    assert_eq!(all.as_array().unwrap().len(), 5);
    assert_eq!(all[0]["id"], first_id);

    let page = app.get("/users?skip=1&limit=2", Some(&token)).await.json();
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["id"], all[1]["id"]);
    assert_eq!(page[1]["id"], all[2]["id"]);
}

#[tokio::test]
async fn test_get_user_by_id() {
    let app = TestApp::new();
    let (id, token) = app.create_test_user().await;

    let response = app.get(&format!("/users/{}", id), Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.json();
    assert_eq!(data["id"], id);
    assert!(data["address"]["street"].is_string());
    assert!(data["company"]["catchPhrase"].is_string());
}

#[tokio::test]
async fn test_get_missing_user_is_not_found() {
    let app = TestApp::new();
    let (_, token) = app.create_test_user().await;

    let response = app.get("/users/9999", Some(&token)).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.create_test_user().await;

    let response = app.get("/users/abc", Some(&token)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_invalid_pagination_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.create_test_user().await;

    let response = app.get("/users?limit=many", Some(&token)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_own_profile() {
    let app = TestApp::new();
    let (id, token) = app.create_test_user().await;

    let response = app
        .put_json(
            &format!("/users/{}", id),
            Some(&token),
            &json!({ "name": "Renamed", "website": "renamed.org" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.json();
    assert_eq!(data["name"], "Renamed");
    assert_eq!(data["website"], "renamed.org");
}

#[tokio::test]
async fn test_update_password_changes_login() {
    let app = TestApp::new();
    let username = common::unique_username();
    let user = app
        .register(&username, &format!("{}@example.com", username))
        .await;
    let token = app.login(&username, PASSWORD).await.json()["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .put_json(
            &format!("/users/{}", user["id"]),
            Some(&token),
            &json!({ "password": "a-brand-new-password" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    assert_eq!(app.login(&username, PASSWORD).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.login(&username, "a-brand-new-password").await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_update_to_taken_username_is_rejected() {
    let app = TestApp::new();
    let (id, token) = app.create_test_user().await;
    app.register("taken", "taken@example.com").await;

    let response = app
        .put_json(&format!("/users/{}", id), Some(&token), &json!({ "username": "taken" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["code"], "DUPLICATE_CREDENTIAL");
}

#[tokio::test]
async fn test_update_other_profile_is_forbidden() {
    let app = TestApp::new();
    let (_, token) = app.create_test_user().await;
    let (other_id, _) = app.create_test_user().await;

    let response = app
        .put_json(&format!("/users/{}", other_id), Some(&token), &json!({ "name": "Hijacked" }))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    let other = app.store.find_by_id(other_id).await.unwrap().unwrap();
    assert_ne!(other.name, "Hijacked");
}

#[tokio::test]
async fn test_delete_other_account_is_forbidden() {
    let app = TestApp::new();
    let (_, token) = app.create_test_user().await;
    let (other_id, _) = app.create_test_user().await;

    let response = app.delete(&format!("/users/{}", other_id), Some(&token)).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(app.store.find_by_id(other_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_full_account_lifecycle() {
    let app = TestApp::new();

    let username = common::unique_username();
    let registered = app
        .register(&username, &format!("{}@example.com", username))
        .await;
    let id = registered["id"].as_i64().unwrap();

    let login = app.login(&username, PASSWORD).await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.json()["access_token"].as_str().unwrap().to_string();

    let me = app.get("/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["username"], username.as_str());

    let deleted = app.delete(&format!("/users/{}", id), Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(deleted.body.is_empty());

    // The token now names an identity that no longer exists
    let me = app.get("/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let (_, other_token) = app.create_test_user().await;
    let lookup = app.get(&format!("/users/{}", id), Some(&other_token)).await;
    assert_eq!(lookup.status, StatusCode::NOT_FOUND);

    assert_eq!(app.login(&username, PASSWORD).await.status, StatusCode::UNAUTHORIZED);
}
