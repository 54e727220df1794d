//! Minimal wiring demo: a hand-driven transport feeding list and get
//! subscriptions, the way a viewer frontend would consume them.
//!
//! Run with `cargo run -p vantage_api --example viewer`.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use vantage_api::{
    ConfigMap, KubeResource, ManualTransport, NamespaceScope, ObjectCell, Pod, SnapshotCell,
    Vantage,
};

fn init_tracing() {
    let env = std::env::var("VANTAGE_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn pod(name: &str, phase: &str, ts: &str) -> serde_json::Value {
    json!({
        "kind": "Pod",
        "apiVersion": "v1",
        "metadata": {
            "name": name,
            "namespace": "default",
            "creationTimestamp": ts
        },
        "status": {"phase": phase}
    })
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    // Swap in `Vantage::try_default().await?` to bind against a live cluster.
    let transport = Arc::new(ManualTransport::new());
    let vantage = Vantage::new(transport.clone());

    let pods: SnapshotCell<Pod> = SnapshotCell::new();
    let _pod_list = vantage.subscribe_list::<Pod, _>(NamespaceScope::All, pods.subscriber())?;

    let config: ObjectCell<ConfigMap> = ObjectCell::new();
    let _config_get = vantage.subscribe_one::<ConfigMap, _>(
        "app-settings",
        NamespaceScope::Namespace("default".into()),
        config.subscriber(),
    )?;

    tokio::time::sleep(Duration::from_millis(20)).await;
    transport
        .push_list(vec![
            pod("web-0", "Running", "2024-01-01T00:00:00Z"),
            pod("web-1", "Pending", "2024-01-01T06:00:00Z"),
        ])
        .await;
    transport
        .push_get(json!({
            "kind": "ConfigMap",
            "metadata": {"name": "app-settings", "namespace": "default"},
            "data": {"theme": "dark"}
        }))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    if let Some(snap) = pods.current() {
        println!("{} pod(s):", snap.len());
        for p in snap.iter() {
            println!(
                "  {:<12} {:<10} {:>6}  {}",
                p.name(),
                p.phase(),
                p.age(),
                p.details_link().unwrap_or_else(|_| "-".into())
            );
        }
    }
    if let Some(cm) = config.current() {
        let theme = cm
            .data()
            .and_then(|d| d.get("theme"))
            .and_then(|v| v.as_str())
            .unwrap_or("?");
        println!("configmap {}: theme={}", cm.name(), theme);
    }
    Ok(())
}
