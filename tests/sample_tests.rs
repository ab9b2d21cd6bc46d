//! Built-in namespace tests: the registry `jrpcd` serves, driven through
//! the engine without a transport.

use jrpc_dispatch::sample;
use jrpc_server::{Engine, EngineConfig};
use serde_json::{json, Value};

fn engine() -> Engine {
    Engine::new(sample::registry().unwrap(), EngineConfig::default()).unwrap()
}

fn call(engine: &Engine, body: Value) -> Value {
    let raw = engine.handle(body.to_string().as_bytes());
    serde_json::from_slice(&raw).unwrap()
}

fn rpc(id: i64, method: &str, params: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params})
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn list_methods_reports_every_exposed_name() {
    let resp = call(&engine(), rpc(1, "system.listMethods", json!([])));
    assert_eq!(
        resp["result"],
        json!([
            "counter.get",
            "counter.increment",
            "system.listMethods",
            "test.hello",
            "test.sleep",
            "test.test_div",
            "vadd.test",
            "vsub.test"
        ])
    );
}

#[test]
fn counter_increments_in_submission_order() {
    let e = engine();
    let resp = call(
        &e,
        json!([
            rpc(1, "counter.increment", json!([])),
            rpc(2, "counter.increment", json!({"by": 5})),
            rpc(3, "counter.increment", json!([-2]))
        ]),
    );

    let items = resp.as_array().unwrap();
    assert_eq!(items.len(), 3);
    // Atomic members run in order, so their replies keep submission order.
    let results: Vec<_> = items
        .iter()
        .map(|r| (r["id"].clone(), r["result"].clone()))
        .collect();
    assert_eq!(
        results,
        vec![(json!(1), json!(1)), (json!(2), json!(6)), (json!(3), json!(4))]
    );

    let resp = call(&e, rpc(4, "counter.get", json!([])));
    assert_eq!(resp["result"], 4);
}

#[test]
fn counter_rejects_bad_argument() {
    let e = engine();
    let resp = call(&e, rpc(1, "counter.increment", json!(["three"])));
    assert_eq!(resp["error"]["code"], -32602);
    assert_eq!(call(&e, rpc(2, "counter.get", json!([])))["result"], 0);
}

#[test]
fn arithmetic_overflow_is_application_error() {
    let e = engine();

    let resp = call(&e, rpc(1, "vadd.test", json!([i64::MAX, 1])));
    assert_eq!(resp["error"]["code"], -32000);
    assert_eq!(resp["error"]["message"], "integer overflow");

    let resp = call(&e, rpc(2, "vsub.test", json!([i64::MIN, 1])));
    assert_eq!(resp["error"]["message"], "integer overflow");

    let resp = call(&e, rpc(3, "test.test_div", json!([i64::MIN, -1])));
    assert_eq!(resp["error"]["message"], "integer overflow");

    let resp = call(&e, rpc(4, "test.test_div", json!([1, 0])));
    assert_eq!(resp["error"]["message"], "division by zero");

    let resp = call(&e, rpc(5, "test.test_div", json!([7, 2])));
    assert_eq!(resp["result"], 3);
}

#[test]
fn hello_binds_by_name() {
    let resp = call(&engine(), rpc(1, "test.hello", json!({"who": "World"})));
    assert_eq!(resp, json!({"jsonrpc": "2.0", "id": 1, "result": "Hello World!"}));
}
