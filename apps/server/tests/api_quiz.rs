//! Quiz API tests.

mod common;

use std::collections::HashMap;

use axum::http::{header::AUTHORIZATION, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use common::{admin_token, bearer, fixtures, user_token, TestContext};

/// Translation of every word in HSK 1 lesson 1, keyed by character.
async fn lesson_translations(server: &TestServer, token: &str) -> HashMap<String, String> {
    let body: Value = server
        .get("/api/levels/1/lessons/1")
        .add_header(AUTHORIZATION, bearer(token))
        .await
        .json();
    body["words"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| {
            (
                w["character"].as_str().unwrap().to_string(),
                w["translation"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

async fn select(server: &TestServer, token: &str, id: &str, side: &str, index: usize) -> Value {
    let response = server
        .post(&format!("/api/quiz/matching/{}/select", id))
        .add_header(AUTHORIZATION, bearer(token))
        .json(&json!({ "side": side, "index": index }))
        .await;
    response.assert_status_ok();
    response.json()
}

/// Test a full matching game updates mastery and logs the result.
#[tokio::test]
async fn test_matching_game_complete() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;
    let translations = lesson_translations(&server, &token).await;

    let response = server
        .post("/api/quiz/matching")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&fixtures::lesson(1, 1))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["id"].as_str().unwrap().to_string();
    let mut game = body["game"].clone();
    assert_eq!(game["rounds"], 3);
    assert_eq!(game["total"], 15);

    for round in 0..3 {
        assert_eq!(game["round"], round);
        let left = game["left"].as_array().unwrap().clone();
        let right = game["right"].as_array().unwrap().clone();
        assert_eq!(left.len(), 5);

        for card in &left {
            let character = card["text"].as_str().unwrap();
            let translation = &translations[character];
            let right_index = right
                .iter()
                .position(|c| c["text"] == translation.as_str())
                .unwrap();

            let pending = select(&server, &token, &id, "left", card["index"].as_u64().unwrap() as usize).await;
            assert_eq!(pending["selection"]["result"], "pending");

            let matched = select(&server, &token, &id, "right", right_index).await;
            assert_eq!(matched["selection"]["result"], "matched");
            assert_eq!(matched["selection"]["character"], character);
            game = matched["game"].clone();
        }
        assert_eq!(game["round_complete"], true);

        let response = server
            .post(&format!("/api/quiz/matching/{}/advance", id))
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        game = body["game"].clone();
        if round < 2 {
            assert_eq!(body["outcome"]["result"], "next_round");
        } else {
            assert_eq!(body["outcome"]["result"], "game_complete");
            assert_eq!(body["outcome"]["score"], 15);
            assert_eq!(body["outcome"]["total"], 15);
        }
    }

    let body: Value = server
        .get("/api/progress")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    let progress = body["progress"].as_object().unwrap();
    assert_eq!(progress.len(), 15);
    assert!(progress.values().all(|p| p["score"] == 1));

    let body: Value = server
        .get("/api/activity")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    let entry = &body["entries"][0];
    assert_eq!(entry["kind"], "quiz_complete");
    assert_eq!(entry["mode"], "matching");
    assert_eq!(entry["score"], 15);
    assert_eq!(entry["lesson"], 1);

    // The finished game is gone.
    server
        .post(&format!("/api/quiz/matching/{}/advance", id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// Test a wrong pair lowers both words and locks the board.
#[tokio::test]
async fn test_matching_mismatch() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;
    let translations = lesson_translations(&server, &token).await;

    let body: Value = server
        .post("/api/quiz/matching")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&fixtures::lesson(1, 1))
        .await
        .json();
    let id = body["id"].as_str().unwrap().to_string();
    let left = body["game"]["left"].as_array().unwrap().clone();
    let right = body["game"]["right"].as_array().unwrap().clone();

    let character = left[0]["text"].as_str().unwrap();
    let wrong = right
        .iter()
        .position(|c| c["text"] != translations[character].as_str())
        .unwrap();

    select(&server, &token, &id, "left", 0).await;
    let body = select(&server, &token, &id, "right", wrong).await;
    assert_eq!(body["selection"]["result"], "mismatched");
    assert_eq!(body["game"]["incorrect"], json!([0, wrong]));

    // The board ignores input during the cool-down.
    let body = select(&server, &token, &id, "left", 1).await;
    assert_eq!(body["selection"]["result"], "ignored");

    let body: Value = server
        .get("/api/progress")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(body["progress"].as_object().unwrap().len(), 2);
    assert!(body["progress"]
        .as_object()
        .unwrap()
        .values()
        .all(|p| p["score"] == 0));

    server
        .post(&format!("/api/quiz/matching/{}/advance", id))
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::CONFLICT);
}

/// Test games are private to their owner.
#[tokio::test]
async fn test_matching_game_owner_only() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let alice = user_token(&server, "alice").await;
    let bob = user_token(&server, "bob").await;

    let body: Value = server
        .post("/api/quiz/matching")
        .add_header(AUTHORIZATION, bearer(&alice))
        .json(&fixtures::lesson(1, 1))
        .await
        .json();
    let id = body["id"].as_str().unwrap();

    server
        .post(&format!("/api/quiz/matching/{}/select", id))
        .add_header(AUTHORIZATION, bearer(&bob))
        .json(&json!({ "side": "left", "index": 0 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .post(&format!("/api/quiz/matching/{}/select", id))
        .add_header(AUTHORIZATION, bearer(&alice))
        .json(&json!({ "side": "left", "index": 9 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// Test a lesson too short for three rounds cannot start a matching game.
#[tokio::test]
async fn test_matching_needs_full_lesson() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = admin_token(&server).await;

    // HSK 3 lesson 2 holds a single word.
    server
        .post("/api/quiz/matching")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&fixtures::lesson(3, 2))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// Test translation choice questions carry four distinct options.
#[tokio::test]
async fn test_choice_quiz() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;

    let response = server
        .post("/api/quiz/choice")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&fixtures::lesson(1, 1))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 15);

    for question in questions {
        let options = question["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        assert!(options.contains(&question["correct_answer"]));
        assert_eq!(question["correct_answer"], question["word"]["translation"]);
    }
}

/// Test building questions only use multi-character words.
#[tokio::test]
async fn test_building_quiz() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;

    let response = server
        .post("/api/quiz/building")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&fixtures::lesson(1, 1))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 6);

    for question in questions {
        let character = question["word"]["character"].as_str().unwrap();
        assert!(character.chars().count() > 1);
        let options = question["options"].as_array().unwrap();
        for c in character.chars() {
            assert!(options.iter().any(|o| o == &c.to_string()));
        }
    }
}

/// Test quizzes respect the VIP lesson lock.
#[tokio::test]
async fn test_quiz_vip_lock() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let token = user_token(&server, "alice").await;

    server
        .post("/api/quiz/choice")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&fixtures::lesson(2, 2))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
