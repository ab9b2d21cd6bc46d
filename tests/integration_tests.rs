//! End-to-end integration tests: HTTP server, engine and registry wired
//! together, exercised through real POST requests.

use std::time::{Duration, Instant};

use jrpc_dispatch::sample;
use jrpc_protocol::Encoding;
use jrpc_server::{Engine, EngineConfig};
use jrpc_transport::{TransportConfig, TransportServer};
use serde_json::{json, Value};

/// Start a test server on a random port.
async fn start_test_server(config: EngineConfig) -> (TransportServer, String) {
    let engine = Engine::new(sample::registry().unwrap(), config).unwrap();
    let transport_config = TransportConfig {
        port: 0, // OS-assigned
        hostname: "127.0.0.1".into(),
        ..Default::default()
    };
    let transport = TransportServer::start(transport_config, engine).await.unwrap();
    let url = format!("http://127.0.0.1:{}", transport.port());
    (transport, url)
}

async fn post(url: &str, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(url)
        .header("content-type", "application/json")
        .body(serde_json::to_vec(body).unwrap())
        .send()
        .await
        .unwrap()
}

async fn post_json(url: &str, body: &Value) -> Value {
    let resp = post(url, body).await;
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_call_round_trip() {
    let (mut server, url) = start_test_server(EngineConfig::default()).await;

    let resp = post(
        &url,
        &json!({"jsonrpc": "2.0", "id": 1, "method": "test.hello", "params": ["World"]}),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert_eq!(content_type, "application/json; charset=utf-8");

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"jsonrpc": "2.0", "id": 1, "result": "Hello World!"}));

    server.stop().await;
}

#[tokio::test]
async fn any_path_is_accepted() {
    let (mut server, url) = start_test_server(EngineConfig::default()).await;

    let body = post_json(
        &format!("{url}/rpc/v1"),
        &json!({"jsonrpc": "2.0", "id": "x", "method": "vsub.test", "params": {"arg1": 5, "arg2": 10}}),
    )
    .await;
    assert_eq!(body, json!({"jsonrpc": "2.0", "id": "x", "result": -5}));

    server.stop().await;
}

#[tokio::test]
async fn application_error_round_trip() {
    let (mut server, url) = start_test_server(EngineConfig::default()).await;

    let body = post_json(
        &url,
        &json!({"jsonrpc": "2.0", "id": 1, "method": "test.test_div", "params": [1, 0]}),
    )
    .await;
    assert_eq!(
        body,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "division by zero"}
        })
    );

    server.stop().await;
}

#[tokio::test]
async fn batch_of_five() {
    let (mut server, url) = start_test_server(EngineConfig::default()).await;

    let body = post_json(
        &url,
        &json!([
            {"jsonrpc": "2.0", "id": 1, "method": "test.hello", "params": ["World"]},
            {"jsonrpc": "2.0", "id": 2, "method": "test.test_div", "params": [1, 0]},
            {"jsonrpc": "2.0", "id": 3, "method": "vadd.test", "params": [5, 10]},
            {"jsonrpc": "2.0", "id": 4, "method": "vsub.test", "params": [5, 10]},
            {"jsonrpc": "2.0", "id": 5, "method": "system.listMethods"}
        ]),
    )
    .await;

    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 5);
    let by_id = |id: i64| items.iter().find(|r| r["id"] == id).unwrap();
    assert_eq!(by_id(1)["result"], "Hello World!");
    assert_eq!(by_id(2)["error"]["code"], -32000);
    assert_eq!(by_id(3)["result"], 15);
    assert_eq!(by_id(4)["result"], -5);
    let methods = by_id(5)["result"].as_array().unwrap();
    assert!(methods.contains(&json!("system.listMethods")));

    server.stop().await;
}

#[tokio::test]
async fn notifications_get_no_responses() {
    let (mut server, url) = start_test_server(EngineConfig::default()).await;

    let resp = post(
        &url,
        &json!({"jsonrpc": "2.0", "method": "test.hello", "params": ["World"]}),
    )
    .await;
    assert_eq!(resp.status(), 200);
    assert!(resp.bytes().await.unwrap().is_empty());

    let resp = post(
        &url,
        &json!([
            {"jsonrpc": "2.0", "method": "test.hello", "params": ["a"]},
            {"jsonrpc": "2.0", "id": null, "method": "test.hello", "params": ["b"]}
        ]),
    )
    .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!([]));

    server.stop().await;
}

#[tokio::test]
async fn idless_errors_get_empty_body() {
    let (mut server, url) = start_test_server(EngineConfig::default()).await;

    let resp = reqwest::Client::new()
        .post(&url)
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.bytes().await.unwrap().is_empty());

    let resp = post(
        &url,
        &json!({"jsonrpc": "2.0", "method": "test.hello", "params": 5}),
    )
    .await;
    assert_eq!(resp.status(), 200);
    assert!(resp.bytes().await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn batch_deadline_reports_timeout() {
    let config = EngineConfig {
        batch_timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let (mut server, url) = start_test_server(config).await;

    let start = Instant::now();
    let body = post_json(
        &url,
        &json!([
            {"jsonrpc": "2.0", "id": 1, "method": "test.sleep", "params": [0.01]},
            {"jsonrpc": "2.0", "id": 2, "method": "test.sleep", "params": [3.0]}
        ]),
    )
    .await;
    assert!(start.elapsed() < Duration::from_secs(2));

    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    let slow = items.iter().find(|r| r["id"] == 2).unwrap();
    assert_eq!(slow["error"]["code"], -32001);
    let fast = items.iter().find(|r| r["id"] == 1).unwrap();
    assert_eq!(fast["result"], 0.01);

    server.stop().await;
}

#[tokio::test]
async fn latin1_encoding_round_trip() {
    let config = EngineConfig {
        encoding: Encoding::Latin1,
        ..Default::default()
    };
    let (mut server, url) = start_test_server(config).await;

    let mut raw = br#"{"jsonrpc":"2.0","id":1,"method":"test.hello","params":[""#.to_vec();
    raw.push(0xE9); // é
    raw.extend_from_slice(br#""]}"#);

    let resp = reqwest::Client::new().post(&url).body(raw).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert_eq!(content_type, "application/json; charset=iso-8859-1");

    let bytes = resp.bytes().await.unwrap();
    let text = Encoding::Latin1.decode(&bytes).unwrap();
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["result"], "Hello \u{e9}!");

    server.stop().await;
}

#[tokio::test]
async fn health_reports_method_count() {
    let (mut server, url) = start_test_server(EngineConfig::default()).await;

    let resp = reqwest::get(format!("{url}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["methods"], 8);
    assert_eq!(body["busyWorkers"], 0);

    server.stop().await;
}
