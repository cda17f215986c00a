//! Integration tests against PostgreSQL
//!
//! Run with `TEST_DATABASE_URL` pointing at a disposable database:
//! `cargo test --test postgres_integration_test -- --ignored`

mod common;

use axum::http::StatusCode;
use common::{registration, unique_username, TestApp, PASSWORD};
use sqlx::PgPool;

async fn count_rows(pool: &PgPool, sql: &str, user_id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn sub_record_counts(pool: &PgPool, user_id: i64) -> (i64, i64, i64) {
    (
        count_rows(pool, "SELECT COUNT(*) FROM addresses WHERE user_id = $1", user_id).await,
        count_rows(
            pool,
            "SELECT COUNT(*) FROM geos g JOIN addresses a ON a.id = g.address_id WHERE a.user_id = $1",
            user_id,
        )
        .await,
        count_rows(pool, "SELECT COUNT(*) FROM companies WHERE user_id = $1", user_id).await,
    )
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_registration_writes_all_records() {
    let app = TestApp::with_database().await;
    let pool = app.pool.clone().unwrap();

    let (id, _) = app.create_test_user().await;

    assert_eq!(sub_record_counts(&pool, id).await, (1, 1, 1));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_registration_leaves_no_partial_rows() {
    let app = TestApp::with_database().await;
    let pool = app.pool.clone().unwrap();
    let username = unique_username();
    app.register(&username, &format!("{}@example.com", username))
        .await;

    let other_email = format!("{}-other@example.com", username);
    let response = app
        .post_json("/auth/register", &registration(&username, &other_email))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let leftovers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&other_email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_removes_sub_records() {
    let app = TestApp::with_database().await;
    let pool = app.pool.clone().unwrap();
    let (id, token) = app.create_test_user().await;

    let response = app.delete(&format!("/users/{}", id), Some(&token)).await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(sub_record_counts(&pool, id).await, (0, 0, 0));
    assert!(app.store.find_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_and_profile_roundtrip() {
    let app = TestApp::with_database().await;
    let username = unique_username();
    let registered = app
        .register(&username, &format!("{}@example.com", username))
        .await;

    let login = app.login(&username, PASSWORD).await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.json()["access_token"].as_str().unwrap().to_string();

    let me = app.get("/auth/me", Some(&token)).await.json();
    assert_eq!(me["id"], registered["id"]);
    assert_eq!(me["address"]["geo"]["lng"], "81.1496");
    assert_eq!(me["company"]["catchPhrase"], "Test Phrase");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_readiness_pings_database() {
    let app = TestApp::with_database().await;

    let response = app.get("/health/ready", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("ready"));
}
