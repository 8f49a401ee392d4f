//! Exercises the admin HTTP surface (`GET /ping`, `PUT /deny/:domain`,
//! `GET /metrics`), grounded on the teacher's `tests/http_server_tests.rs`
//! (bind an ephemeral listener, spawn the server, hit it with `reqwest`).

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tollgate::denylist::{Repository, Service as DenylistService};
use tollgate::http_server::HttpServer;
use tollgate::logger::Logger;
use tollgate::metrics::Metrics;

async fn spawn_server() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let bind_addr = listener.local_addr().unwrap();
    drop(listener);

    let denylist = Arc::new(DenylistService::new(Repository::new()));
    let metrics = Arc::new(Metrics::new().unwrap());
    let server = HttpServer::new(bind_addr, denylist, metrics, Logger::new("HTTP"));

    tokio::spawn(async move {
        let _ = server.run().await;
    });
    tokio::time::sleep(Duration::from_millis(150)).await;
    bind_addr
}

#[tokio::test]
async fn ping_returns_pong() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();
    let response = timeout(Duration::from_secs(5), client.get(format!("http://{addr}/ping")).send())
        .await
        .expect("request should not time out")
        .expect("request should succeed");

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "pong");
}

#[tokio::test]
async fn deny_endpoint_accepts_a_domain() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();
    let response = timeout(
        Duration::from_secs(5),
        client.put(format!("http://{addr}/deny/ads.example.com")).send(),
    )
    .await
    .expect("request should not time out")
    .expect("request should succeed");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("ads.example.com"));
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_text() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();
    let response = timeout(Duration::from_secs(5), client.get(format!("http://{addr}/metrics")).send())
        .await
        .expect("request should not time out")
        .expect("request should succeed");

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("tollgate_cache_hits_total"));
}

#[tokio::test]
async fn unknown_route_is_a_404() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();
    let response = timeout(Duration::from_secs(5), client.get(format!("http://{addr}/nonexistent")).send())
        .await
        .expect("request should not time out")
        .expect("request should succeed");

    assert_eq!(response.status(), 404);
}
