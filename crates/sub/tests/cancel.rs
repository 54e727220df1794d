#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use vantage_core::NamespaceScope;
use vantage_model::{ConfigMap, KubeResource};
use vantage_sub::{Binding, Endpoints, ListUpdate, ManualTransport, SubscriptionManager};

fn cm(name: &str) -> serde_json::Value {
    json!({
        "kind": "ConfigMap",
        "apiVersion": "v1",
        "metadata": {"name": name, "namespace": "default", "resourceVersion": "1"}
    })
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}

fn manager() -> (Arc<ManualTransport>, SubscriptionManager) {
    vantage_registry::builtins::register_builtins().unwrap();
    let transport = Arc::new(ManualTransport::new());
    let manager = SubscriptionManager::new(transport.clone());
    (transport, manager)
}

fn list_op(manager_ns: &str) -> vantage_sub::ListOp {
    Endpoints::for_kind("ConfigMap")
        .unwrap()
        .list_op(NamespaceScope::Namespace(manager_ns.into()))
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_handle_drops_late_deliveries() {
    let (transport, manager) = manager();
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = calls.clone();
    let handle = manager.subscribe_list(list_op("default"), ConfigMap::wrap, move |_: ListUpdate<ConfigMap>| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    settle().await;

    transport.push_list(vec![cm("a")]).await;
    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(handle.is_active());

    handle.cancel();
    assert!(!handle.is_active());

    // A delivery arriving after cancellation is dropped, not queued.
    transport.push_list_to(0, vec![cm("b")]).await;
    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropping_the_handle_cancels() {
    let (transport, manager) = manager();
    let calls = Arc::new(AtomicUsize::new(0));
    let sink = calls.clone();
    {
        let _handle = manager.subscribe_list(
            list_op("default"),
            ConfigMap::wrap,
            move |_: ListUpdate<ConfigMap>| {
                sink.fetch_add(1, Ordering::SeqCst);
            },
        );
        settle().await;
        transport.push_list(vec![cm("a")]).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    transport.push_list_to(0, vec![cm("b")]).await;
    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rebinding_cancels_the_stale_handle_first() {
    let (transport, manager) = manager();
    let old_calls = Arc::new(AtomicUsize::new(0));
    let new_calls = Arc::new(AtomicUsize::new(0));
    let mut binding: Binding<(String, String)> = Binding::new();

    let sink = old_calls.clone();
    let m = manager.clone();
    binding.ensure(("ConfigMap".into(), "default".into()), move || {
        m.subscribe_list(list_op("default"), ConfigMap::wrap, move |_: ListUpdate<ConfigMap>| {
            sink.fetch_add(1, Ordering::SeqCst);
        })
    });
    settle().await;
    transport.push_list_to(0, vec![cm("a")]).await;
    settle().await;
    assert_eq!(old_calls.load(Ordering::SeqCst), 1);

    // Same key: no rearm.
    let rearmed = binding.ensure(("ConfigMap".into(), "default".into()), || unreachable!());
    assert!(!rearmed);

    // New namespace: the stale handle is cancelled before the new one arms.
    let sink = new_calls.clone();
    let m = manager.clone();
    let rearmed = binding.ensure(("ConfigMap".into(), "prod".into()), move || {
        m.subscribe_list(list_op("prod"), ConfigMap::wrap, move |_: ListUpdate<ConfigMap>| {
            sink.fetch_add(1, Ordering::SeqCst);
        })
    });
    assert!(rearmed);
    settle().await;

    // A late delivery on the old feed is never observed.
    transport.push_list_to(0, vec![cm("stale")]).await;
    transport.push_list_to(1, vec![cm("fresh")]).await;
    settle().await;
    assert_eq!(old_calls.load(Ordering::SeqCst), 1);
    assert_eq!(new_calls.load(Ordering::SeqCst), 1);

    binding.clear();
    assert!(binding.handle().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn grouped_subscriptions_cancel_together() {
    let (transport, manager) = manager();
    let calls_a = Arc::new(AtomicUsize::new(0));
    let calls_b = Arc::new(AtomicUsize::new(0));

    let mut set = manager.set();
    let sink = calls_a.clone();
    set.add_list(list_op("default"), ConfigMap::wrap, move |_: ListUpdate<ConfigMap>| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    let sink = calls_b.clone();
    set.add_list(list_op("prod"), ConfigMap::wrap, move |_: ListUpdate<ConfigMap>| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    let handle = set.into_handle();
    settle().await;
    assert_eq!(transport.open_lists(), 2);

    transport.push_list_to(0, vec![cm("a")]).await;
    transport.push_list_to(1, vec![cm("b")]).await;
    settle().await;
    assert_eq!(calls_a.load(Ordering::SeqCst), 1);
    assert_eq!(calls_b.load(Ordering::SeqCst), 1);

    handle.cancel();
    transport.push_list_to(0, vec![cm("c")]).await;
    transport.push_list_to(1, vec![cm("d")]).await;
    settle().await;
    assert_eq!(calls_a.load(Ordering::SeqCst), 1);
    assert_eq!(calls_b.load(Ordering::SeqCst), 1);
}
