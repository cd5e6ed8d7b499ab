use std::net::SocketAddr;
use std::time::Duration;

use axum::{Json, Router, extract::Path, http::StatusCode, response::IntoResponse, routing::get};
use fish_proxy::upstream::{FetchError, FishWatchClient, SpeciesSource};
use serde_json::json;

async fn species(Path(species): Path<String>) -> axum::response::Response {
    match species.as_str() {
        "red-snapper" => Json(json!([{ "Species Name": "Red Snapper" }])).into_response(),
        "broken" => (StatusCode::OK, "<html>oops</html>").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!([])).into_response()
        }
        name if name.contains('/') || name.contains('?') => {
            Json(json!([{ "echo": name }])).into_response()
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn spawn_upstream() -> SocketAddr {
    let app = Router::new().route("/api/species/{species}", get(species));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> FishWatchClient {
    FishWatchClient::new(&format!("http://{}", addr), Duration::from_millis(500)).unwrap()
}

#[tokio::test]
async fn fetches_and_parses_json() {
    let addr = spawn_upstream().await;
    let data = client(addr).fetch("red-snapper").await.unwrap();
    assert_eq!(data, json!([{ "Species Name": "Red Snapper" }]));
}

#[tokio::test]
async fn reserved_characters_reach_upstream_as_one_segment() {
    let addr = spawn_upstream().await;
    let data = client(addr).fetch("../robots.txt?x=1").await.unwrap();
    assert_eq!(data, json!([{ "echo": "../robots.txt?x=1" }]));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let addr = spawn_upstream().await;
    let err = client(addr).fetch("unknown").await.unwrap_err();
    assert!(matches!(err, FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
}

#[tokio::test]
async fn malformed_body_is_an_error() {
    let addr = spawn_upstream().await;
    let err = client(addr).fetch("broken").await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
}

#[tokio::test]
async fn hung_upstream_times_out() {
    let addr = spawn_upstream().await;
    let err = client(addr).fetch("slow").await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

#[tokio::test]
async fn unreachable_upstream_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr).fetch("red-snapper").await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}
