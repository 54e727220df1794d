//! Hand-driven transport for tests, demos, and offline development.

#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use vantage_core::{NamespaceScope, RawObject, VantageError};
use vantage_registry::ResourceDescriptor;

use crate::transport::{GetDelivery, ListDelivery, Transport};

struct ListFeed {
    desc: Arc<ResourceDescriptor>,
    scope: NamespaceScope,
    tx: mpsc::Sender<ListDelivery>,
}

struct GetFeed {
    desc: Arc<ResourceDescriptor>,
    name: String,
    tx: mpsc::Sender<GetDelivery>,
}

/// Transport whose feeds are driven by hand. Each `list`/`get` call
/// registers a feed and stays open until the subscriber goes away; pushes
/// address a feed by registration index (or the most recent one).
#[derive(Default)]
pub struct ManualTransport {
    lists: Mutex<Vec<ListFeed>>,
    gets: Mutex<Vec<GetFeed>>,
}

impl ManualTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_lists(&self) -> usize {
        self.lists.lock().unwrap().len()
    }

    pub fn open_gets(&self) -> usize {
        self.gets.lock().unwrap().len()
    }

    /// Kind served by list feed `idx`, for assertions.
    pub fn list_feed_kind(&self, idx: usize) -> Option<String> {
        self.lists
            .lock()
            .unwrap()
            .get(idx)
            .map(|f| f.desc.kind.clone())
    }

    pub fn list_feed_scope(&self, idx: usize) -> Option<NamespaceScope> {
        self.lists.lock().unwrap().get(idx).map(|f| f.scope.clone())
    }

    /// (kind, object name) addressed by get feed `idx`.
    pub fn get_feed_target(&self, idx: usize) -> Option<(String, String)> {
        self.gets
            .lock()
            .unwrap()
            .get(idx)
            .map(|f| (f.desc.kind.clone(), f.name.clone()))
    }

    pub async fn push_list(&self, items: Vec<RawObject>) {
        let tx = self.last_list_tx();
        if let Some(tx) = tx {
            let _ = tx.send(Ok(items)).await;
        }
    }

    pub async fn push_list_err(&self, err: VantageError) {
        let tx = self.last_list_tx();
        if let Some(tx) = tx {
            let _ = tx.send(Err(err)).await;
        }
    }

    /// Push to a specific feed; late pushes to a cancelled feed are dropped
    /// by the closed channel.
    pub async fn push_list_to(&self, idx: usize, items: Vec<RawObject>) {
        let tx = self.lists.lock().unwrap().get(idx).map(|f| f.tx.clone());
        if let Some(tx) = tx {
            let _ = tx.send(Ok(items)).await;
        }
    }

    pub async fn push_get(&self, item: RawObject) {
        let tx = self.last_get_tx();
        if let Some(tx) = tx {
            let _ = tx.send(Ok(item)).await;
        }
    }

    pub async fn push_get_err(&self, err: VantageError) {
        let tx = self.last_get_tx();
        if let Some(tx) = tx {
            let _ = tx.send(Err(err)).await;
        }
    }

    pub async fn push_get_to(&self, idx: usize, item: RawObject) {
        let tx = self.gets.lock().unwrap().get(idx).map(|f| f.tx.clone());
        if let Some(tx) = tx {
            let _ = tx.send(Ok(item)).await;
        }
    }

    fn last_list_tx(&self) -> Option<mpsc::Sender<ListDelivery>> {
        self.lists.lock().unwrap().last().map(|f| f.tx.clone())
    }

    fn last_get_tx(&self) -> Option<mpsc::Sender<GetDelivery>> {
        self.gets.lock().unwrap().last().map(|f| f.tx.clone())
    }
}

#[async_trait::async_trait]
impl Transport for ManualTransport {
    async fn list(
        &self,
        desc: Arc<ResourceDescriptor>,
        scope: NamespaceScope,
        tx: mpsc::Sender<ListDelivery>,
    ) -> anyhow::Result<()> {
        self.lists.lock().unwrap().push(ListFeed {
            desc,
            scope,
            tx: tx.clone(),
        });
        tx.closed().await;
        Ok(())
    }

    async fn get(
        &self,
        desc: Arc<ResourceDescriptor>,
        name: String,
        _scope: NamespaceScope,
        tx: mpsc::Sender<GetDelivery>,
    ) -> anyhow::Result<()> {
        self.gets.lock().unwrap().push(GetFeed {
            desc,
            name,
            tx: tx.clone(),
        });
        tx.closed().await;
        Ok(())
    }
}
