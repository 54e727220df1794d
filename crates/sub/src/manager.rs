//! Subscription lifecycle: gates, handles, groups, rebinding.

#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex};

use metrics::{counter, histogram};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use vantage_core::{RawObject, VantageError, VantageResult};
use vantage_model::reconcile::reconcile_with;

use crate::endpoint::{GetOp, ListOp};
use crate::transport::Transport;

/// Updates delivered to a list handler. Every snapshot supersedes the
/// previous one wholesale.
#[derive(Debug)]
pub enum ListUpdate<T> {
    Snapshot(Arc<Vec<T>>),
    Error(VantageError),
}

/// Updates delivered to a get handler.
#[derive(Debug)]
pub enum GetUpdate<T> {
    Object(T),
    Error(VantageError),
}

/// Delivery gate shared by every op in a subscription. Dispatch and
/// cancellation serialize on the same lock, so once `close` returns no
/// handler runs again.
#[derive(Debug)]
struct Gate {
    active: Mutex<bool>,
}

impl Gate {
    fn new() -> Self {
        Self {
            active: Mutex::new(true),
        }
    }

    fn dispatch(&self, f: impl FnOnce()) -> bool {
        let guard = self.active.lock().unwrap();
        if !*guard {
            counter!("sub_dropped_after_cancel_total", 1u64);
            return false;
        }
        f();
        true
    }

    fn close(&self) {
        *self.active.lock().unwrap() = false;
    }

    fn is_active(&self) -> bool {
        *self.active.lock().unwrap()
    }
}

/// Live, cancellable binding between a subscription and its delivery
/// stream. Dropping the handle cancels it.
#[derive(Debug)]
pub struct SubscriptionHandle {
    gate: Arc<Gate>,
    tasks: Vec<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn is_active(&self) -> bool {
        self.gate.is_active()
    }

    /// Stop delivery. Synchronous: when this returns, the handlers will not
    /// run again, even for responses already in flight.
    pub fn cancel(&self) {
        self.gate.close();
        for t in &self.tasks {
            t.abort();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Issues fetch/watch calls and wires deliveries to handler lifecycles.
#[derive(Clone)]
pub struct SubscriptionManager {
    transport: Arc<dyn Transport>,
}

impl SubscriptionManager {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Arm a list subscription. Each delivery is reconciled into a fresh
    /// snapshot of wrappers and handed to `handler`; transport errors arrive
    /// on the same handler and leave the subscription active.
    pub fn subscribe_list<T, F, H>(&self, op: ListOp, wrap: F, handler: H) -> SubscriptionHandle
    where
        T: Send + Sync + 'static,
        F: Fn(RawObject) -> VantageResult<T> + Send + 'static,
        H: FnMut(ListUpdate<T>) + Send + 'static,
    {
        let gate = Arc::new(Gate::new());
        let tasks = self.spawn_list(gate.clone(), op, wrap, handler);
        SubscriptionHandle { gate, tasks }
    }

    /// Arm a get subscription for a single object. The transport may stream
    /// repeated deliveries for the same object.
    pub fn subscribe_one<T, F, H>(&self, op: GetOp, wrap: F, handler: H) -> SubscriptionHandle
    where
        T: Send + Sync + 'static,
        F: Fn(RawObject) -> VantageResult<T> + Send + 'static,
        H: FnMut(GetUpdate<T>) + Send + 'static,
    {
        let gate = Arc::new(Gate::new());
        let tasks = self.spawn_get(gate.clone(), op, wrap, handler);
        SubscriptionHandle { gate, tasks }
    }

    /// Start a group of operations armed and cancelled together.
    pub fn set(&self) -> SubscriptionSet {
        SubscriptionSet {
            manager: self.clone(),
            gate: Arc::new(Gate::new()),
            tasks: Vec::new(),
        }
    }

    fn spawn_list<T, F, H>(
        &self,
        gate: Arc<Gate>,
        op: ListOp,
        wrap: F,
        mut handler: H,
    ) -> Vec<JoinHandle<()>>
    where
        T: Send + Sync + 'static,
        F: Fn(RawObject) -> VantageResult<T> + Send + 'static,
        H: FnMut(ListUpdate<T>) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel(crate::queue_cap());
        let transport = self.transport.clone();
        let desc = op.desc.clone();
        let scope = op.scope.clone();
        info!(gvk = %desc.gvk_key(), scope = %scope, "sub: list armed");
        let feed = tokio::spawn(async move {
            if let Err(e) = transport.list(desc, scope, tx).await {
                warn!(error = %e, "sub: list feed failed");
            }
        });
        let pump = tokio::spawn(async move {
            let mut prev: Option<Arc<Vec<T>>> = None;
            while let Some(delivery) = rx.recv().await {
                counter!("sub_deliveries_total", 1u64);
                match delivery {
                    Ok(items) => {
                        let next = Arc::new(reconcile_with(
                            prev.as_deref().map(|v| v.as_slice()),
                            items,
                            &wrap,
                        ));
                        histogram!("snapshot_items", next.len() as f64);
                        let update = ListUpdate::Snapshot(next.clone());
                        if !gate.dispatch(|| handler(update)) {
                            break;
                        }
                        prev = Some(next);
                    }
                    Err(e) => {
                        if !gate.dispatch(|| handler(ListUpdate::Error(e))) {
                            break;
                        }
                    }
                }
            }
        });
        vec![feed, pump]
    }

    fn spawn_get<T, F, H>(
        &self,
        gate: Arc<Gate>,
        op: GetOp,
        wrap: F,
        mut handler: H,
    ) -> Vec<JoinHandle<()>>
    where
        T: Send + Sync + 'static,
        F: Fn(RawObject) -> VantageResult<T> + Send + 'static,
        H: FnMut(GetUpdate<T>) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel(crate::queue_cap());
        let transport = self.transport.clone();
        let desc = op.desc.clone();
        let name = op.name.clone();
        let scope = op.scope.clone();
        info!(gvk = %desc.gvk_key(), name = %name, scope = %scope, "sub: get armed");
        let feed = tokio::spawn(async move {
            if let Err(e) = transport.get(desc, name, scope, tx).await {
                warn!(error = %e, "sub: get feed failed");
            }
        });
        let pump = tokio::spawn(async move {
            while let Some(delivery) = rx.recv().await {
                counter!("sub_deliveries_total", 1u64);
                // A malformed payload fails this one delivery, nothing else.
                let update = match delivery.and_then(&wrap) {
                    Ok(obj) => GetUpdate::Object(obj),
                    Err(e) => GetUpdate::Error(e),
                };
                if !gate.dispatch(|| handler(update)) {
                    break;
                }
            }
        });
        vec![feed, pump]
    }
}

/// Group of operations behind one shared gate: armed together, cancelled
/// together. Deliveries stay routed to each op's own handler and carry no
/// ordering guarantee across ops.
pub struct SubscriptionSet {
    manager: SubscriptionManager,
    gate: Arc<Gate>,
    tasks: Vec<JoinHandle<()>>,
}

impl SubscriptionSet {
    pub fn add_list<T, F, H>(&mut self, op: ListOp, wrap: F, handler: H)
    where
        T: Send + Sync + 'static,
        F: Fn(RawObject) -> VantageResult<T> + Send + 'static,
        H: FnMut(ListUpdate<T>) + Send + 'static,
    {
        let mut tasks = self.manager.spawn_list(self.gate.clone(), op, wrap, handler);
        self.tasks.append(&mut tasks);
    }

    pub fn add_one<T, F, H>(&mut self, op: GetOp, wrap: F, handler: H)
    where
        T: Send + Sync + 'static,
        F: Fn(RawObject) -> VantageResult<T> + Send + 'static,
        H: FnMut(GetUpdate<T>) + Send + 'static,
    {
        let mut tasks = self.manager.spawn_get(self.gate.clone(), op, wrap, handler);
        self.tasks.append(&mut tasks);
    }

    /// Seal the set into one handle sharing the common boundary.
    pub fn into_handle(self) -> SubscriptionHandle {
        SubscriptionHandle {
            gate: self.gate,
            tasks: self.tasks,
        }
    }
}

/// Tracks the subscription for the current selection and swaps it when the
/// selection changes. The stale handle is cancelled before the replacement
/// is armed, so no stale delivery is observed after the swap.
pub struct Binding<K: PartialEq> {
    key: Option<K>,
    handle: Option<SubscriptionHandle>,
}

impl<K: PartialEq> Binding<K> {
    pub fn new() -> Self {
        Self {
            key: None,
            handle: None,
        }
    }

    /// Returns true when the binding was (re)armed.
    pub fn ensure(&mut self, key: K, arm: impl FnOnce() -> SubscriptionHandle) -> bool {
        if self.key.as_ref() == Some(&key) && self.handle.is_some() {
            return false;
        }
        if let Some(old) = self.handle.take() {
            old.cancel();
        }
        self.handle = Some(arm());
        self.key = Some(key);
        true
    }

    /// Cancel the current subscription, if any.
    pub fn clear(&mut self) {
        if let Some(old) = self.handle.take() {
            old.cancel();
        }
        self.key = None;
    }

    pub fn handle(&self) -> Option<&SubscriptionHandle> {
        self.handle.as_ref()
    }
}

impl<K: PartialEq> Default for Binding<K> {
    fn default() -> Self {
        Self::new()
    }
}
