//! Built-in method namespaces served by `jrpcd`.

use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use jrpc_protocol::Params;
use jrpc_server::{Method, Namespace, Registry, RegistryError};
use serde_json::json;
use tracing::info;

/// `test.*`: greeting, integer division and a sleep for exercising deadlines.
fn test_namespace() -> Result<Namespace, RegistryError> {
    let mut ns = Namespace::new();
    ns.register(
        "hello",
        Method::new(|p: Params| {
            let who: String = p.get(0, "who")?;
            Ok(json!(format!("Hello {who}!")))
        })
        .expose(),
    )?
    .register(
        "test_div",
        Method::new(|p: Params| {
            let a: i64 = p.get(0, "a")?;
            let b: i64 = p.get(1, "b")?;
            if b == 0 {
                return Err(anyhow!("division by zero").into());
            }
            let q = a.checked_div(b).ok_or_else(|| anyhow!("integer overflow"))?;
            Ok(json!(q))
        })
        .expose(),
    )?
    .register(
        "sleep",
        Method::new(|p: Params| {
            let seconds: f64 = p.get(0, "seconds")?;
            thread::sleep(Duration::from_secs_f64(seconds.max(0.0)));
            Ok(json!(seconds))
        })
        .expose(),
    )?;
    Ok(ns)
}

/// `vadd.test` / `vsub.test`: the same signature with different arithmetic.
fn volatile(add: bool) -> Result<Namespace, RegistryError> {
    let mut ns = Namespace::new();
    ns.register(
        "test",
        Method::new(move |p: Params| {
            let arg1: i64 = p.get(0, "arg1")?;
            let arg2: i64 = p.get(1, "arg2")?;
            let value = if add {
                arg1.checked_add(arg2)
            } else {
                arg1.checked_sub(arg2)
            };
            Ok(json!(value.ok_or_else(|| anyhow!("integer overflow"))?))
        })
        .expose(),
    )?;
    Ok(ns)
}

/// `counter.*`: process-wide counter, mutated only from the receiving thread.
fn counter_namespace() -> Result<Namespace, RegistryError> {
    let value = Arc::new(parking_lot::Mutex::new(0i64));
    let mut ns = Namespace::new();

    let v = value.clone();
    ns.register(
        "increment",
        Method::new(move |p: Params| {
            let by: i64 = p.get_opt(0, "by")?.unwrap_or(1);
            let mut guard = v.lock();
            *guard = guard
                .checked_add(by)
                .ok_or_else(|| anyhow!("integer overflow"))?;
            Ok(json!(*guard))
        })
        .expose()
        .atomic(),
    )?;

    let v = value;
    ns.register("get", Method::new(move |_| Ok(json!(*v.lock()))).expose())?;
    Ok(ns)
}

/// Build the registry served by the daemon.
pub fn registry() -> Result<Registry, RegistryError> {
    let names: Arc<OnceLock<Vec<String>>> = Arc::new(OnceLock::new());

    let mut system = Namespace::new();
    let listed = names.clone();
    system.register(
        "listMethods",
        Method::new(move |_| Ok(json!(listed.get().cloned().unwrap_or_default()))).expose(),
    )?;

    let mut builder = Registry::builder();
    builder
        .mount("test", test_namespace()?)?
        .mount("vadd", volatile(true)?)?
        .mount("vsub", volatile(false)?)?
        .mount("counter", counter_namespace()?)?
        .mount("system", system)?;
    let registry = builder.build();

    let methods = registry.methods();
    for name in &methods {
        info!("Registered method: {name}");
    }
    let _ = names.set(methods);
    Ok(registry)
}
