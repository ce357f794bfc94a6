// tests/trivia_tests.rs

use std::sync::Arc;

use axum::{Json, Router, http::StatusCode, routing::get};
use base64::{Engine, engine::general_purpose::STANDARD};
use eduquiz::{
    error::AppError,
    models::catalog::Difficulty,
    store::{Gateway, MemoryStore},
    trivia::{OpenTriviaClient, QuestionRequest, QuestionSource, SourceError},
};
use serde_json::{Value, json};

fn item(i: usize) -> Value {
    json!({
        "type": STANDARD.encode("multiple"),
        "difficulty": STANDARD.encode("easy"),
        "category": STANDARD.encode("General Knowledge"),
        "question": STANDARD.encode(format!("Question {}?", i)),
        "correct_answer": STANDARD.encode("yes"),
        "incorrect_answers": [
            STANDARD.encode("no"),
            STANDARD.encode("maybe"),
            STANDARD.encode("never")
        ]
    })
}

/// Spawns a fake trivia endpoint on a random port and returns its base URL.
async fn spawn_trivia_server() -> String {
    let app = Router::new()
        .route(
            "/status500",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/code1",
            get(|| async { Json(json!({ "response_code": 1, "results": [] })) }),
        )
        .route(
            "/short",
            get(|| async {
                Json(json!({
                    "response_code": 0,
                    "results": (0..4).map(item).collect::<Vec<_>>()
                }))
            }),
        )
        .route("/garbage", get(|| async { "<html>maintenance</html>" }))
        .route(
            "/ok",
            get(|| async {
                Json(json!({
                    "response_code": 0,
                    "results": (0..10).map(item).collect::<Vec<_>>()
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

fn request() -> QuestionRequest {
    QuestionRequest {
        amount: 10,
        category: 9,
        difficulty: Difficulty::Easy,
    }
}

async fn fetch(url: &str) -> Result<usize, SourceError> {
    let client = OpenTriviaClient::new(url).unwrap();
    client.fetch(request()).await.map(|items| items.len())
}

#[tokio::test]
async fn full_set_is_returned() {
    let address = spawn_trivia_server().await;

    let count = fetch(&format!("{}/ok", address)).await.unwrap();

    assert_eq!(count, 10);
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let address = spawn_trivia_server().await;

    let err = fetch(&format!("{}/status500", address)).await.unwrap_err();

    assert!(
        matches!(err, SourceError::Status(status) if status.as_u16() == 500),
        "{err:?}"
    );
}

#[tokio::test]
async fn nonzero_response_code_is_reported() {
    let address = spawn_trivia_server().await;

    let err = fetch(&format!("{}/code1", address)).await.unwrap_err();

    assert!(matches!(err, SourceError::ResponseCode(1)), "{err:?}");
}

#[tokio::test]
async fn short_result_list_is_incomplete() {
    let address = spawn_trivia_server().await;

    let err = fetch(&format!("{}/short", address)).await.unwrap_err();

    assert!(
        matches!(
            err,
            SourceError::Incomplete {
                expected: 10,
                received: 4
            }
        ),
        "{err:?}"
    );
}

#[tokio::test]
async fn non_json_body_is_rejected() {
    let address = spawn_trivia_server().await;

    let err = fetch(&format!("{}/garbage", address)).await.unwrap_err();

    assert!(matches!(err, SourceError::InvalidBody(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_source_is_a_transport_error() {
    // Grab a free port, then release it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = fetch(&format!("http://127.0.0.1:{}/api.php", port))
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn gateway_reports_source_unavailable() {
    let address = spawn_trivia_server().await;
    let client = OpenTriviaClient::new(&format!("{}/status500", address)).unwrap();
    let gateway = Gateway::new(Arc::new(MemoryStore::new()), Arc::new(client));

    let err = gateway.fetch_questions(request()).await.unwrap_err();

    match err {
        AppError::SourceUnavailable(msg) => assert!(msg.contains("HTTP 500"), "{msg}"),
        other => panic!("unexpected error {:?}", other),
    }
}
