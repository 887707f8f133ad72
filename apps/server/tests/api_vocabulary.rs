//! Level, lesson and search API tests.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use common::{admin_token, bearer, user_token, TestContext};

/// Test the level overview covers all six levels.
#[tokio::test]
async fn test_levels() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;

    let response = server
        .get("/api/levels")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let levels: Vec<Value> = response.json();
    assert_eq!(levels.len(), 6);
    assert_eq!(levels[0]["level"], 1);
    assert_eq!(levels[0]["total_words"], 60);
    assert_eq!(levels[0]["lessons"], 4);
    assert_eq!(levels[0]["free_lessons"], 4);
    assert_eq!(levels[1]["lessons"], 2);
    assert_eq!(levels[1]["free_lessons"], 1);
}

/// Test a lesson returns its fifteen words in order.
#[tokio::test]
async fn test_lesson_words() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;

    let response = server
        .get("/api/levels/1/lessons/1")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let words = body["words"].as_array().unwrap();
    assert_eq!(words.len(), 15);
    assert_eq!(words[0]["character"], "爱");
    assert_eq!(body["lessons"], 4);
    assert_eq!(body["learned"], 0);
}

/// Test out-of-range lessons and invalid levels.
#[tokio::test]
async fn test_lesson_out_of_range() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;

    for path in ["/api/levels/1/lessons/0", "/api/levels/1/lessons/5"] {
        server
            .get(path)
            .add_header(AUTHORIZATION, bearer(&token))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    server
        .get("/api/levels/7/lessons/1")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// Test the second half of HSK 2 is locked until VIP is active.
#[tokio::test]
async fn test_vip_lesson_lock() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;

    server
        .get("/api/levels/2/lessons/1")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
    server
        .get("/api/levels/2/lessons/2")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    ctx.make_vip("alice", Some(yesterday));
    server
        .get("/api/levels/2/lessons/2")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let today = Utc::now().date_naive();
    ctx.make_vip("alice", Some(today));
    server
        .get("/api/levels/2/lessons/2")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
}

/// Test the admin always has VIP access.
#[tokio::test]
async fn test_admin_is_vip() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = admin_token(&server).await;

    server
        .get("/api/levels/2/lessons/2")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();
}

/// Test search ignores tone marks.
#[tokio::test]
async fn test_search_tone_insensitive() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;

    for query in ["ai", "ài"] {
        let body: Value = server
            .get("/api/search")
            .add_query_param("q", query)
            .add_header(AUTHORIZATION, bearer(&token))
            .await
            .json();
        let results = body["results"].as_array().unwrap();
        assert!(results
            .iter()
            .any(|r| r["character"] == "爱" && r["level"] == 1));
    }

    let body: Value = server
        .get("/api/search")
        .add_query_param("q", "   ")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert!(body["results"].as_array().unwrap().is_empty());
}

/// Test recent searches are recorded newest first and can be cleared.
#[tokio::test]
async fn test_recent_searches() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;

    for character in ["爱", "八", "爱"] {
        server
            .post("/api/search/recent")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "character": character, "level": 1 }))
            .await
            .assert_status_ok();
    }

    let body: Value = server
        .get("/api/search/recent")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    let recent = body["recent"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["character"], "爱");
    assert_eq!(recent[1]["character"], "八");

    server
        .post("/api/search/recent")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "character": "爱", "level": 2 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .delete("/api/search/recent")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let body: Value = server
        .get("/api/search/recent")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert!(body["recent"].as_array().unwrap().is_empty());
}
