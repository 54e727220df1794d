//! kube-client transport: initial list plus watch, folded into full
//! snapshot re-deliveries.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use kube::{
    api::{Api, DynamicObject, ListParams},
    core::ApiResource,
    runtime::watcher::{self, Event},
    Client,
};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use vantage_core::{NamespaceScope, RawObject, VantageError};
use vantage_registry::ResourceDescriptor;

use crate::transport::{GetDelivery, ListDelivery, Transport};

/// Transport over a live cluster connection.
pub struct KubeTransport {
    client: Client,
}

impl KubeTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect with the default kubeconfig/in-cluster config.
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await.context("building kube client")?;
        Ok(Self::new(client))
    }

    fn api_for(&self, desc: &ResourceDescriptor, scope: &NamespaceScope) -> Api<DynamicObject> {
        let ar = ApiResource {
            group: desc.group.clone(),
            version: desc.version.clone(),
            api_version: desc.api_version(),
            kind: desc.kind.clone(),
            plural: desc.plural.clone(),
        };
        if desc.namespaced {
            match scope {
                NamespaceScope::Namespace(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
                _ => Api::all_with(self.client.clone(), &ar),
            }
        } else {
            Api::all_with(self.client.clone(), &ar)
        }
    }
}

fn strip_managed_fields(v: &mut RawObject) {
    if let Some(meta) = v.get_mut("metadata") {
        if let Some(obj) = meta.as_object_mut() {
            obj.remove("managedFields");
        }
    }
}

/// LIST items come back without type meta; fill it in from the descriptor
/// so payloads carry `kind` like watch events do.
fn ensure_type_meta(v: &mut RawObject, desc: &ResourceDescriptor) {
    if let Some(obj) = v.as_object_mut() {
        if !obj.contains_key("kind") {
            obj.insert("kind".into(), desc.kind.clone().into());
        }
        if !obj.contains_key("apiVersion") {
            obj.insert("apiVersion".into(), desc.api_version().into());
        }
    }
}

fn normalize(obj: &DynamicObject, desc: &ResourceDescriptor) -> Result<(String, RawObject)> {
    let key = match obj.metadata.uid.as_deref() {
        Some(uid) => uid.to_string(),
        None => format!(
            "{}/{}",
            obj.metadata.namespace.as_deref().unwrap_or(""),
            obj.metadata.name.as_deref().unwrap_or("")
        ),
    };
    let mut raw = serde_json::to_value(obj).context("serializing DynamicObject")?;
    strip_managed_fields(&mut raw);
    ensure_type_meta(&mut raw, desc);
    Ok((key, raw))
}

/// Insertion-ordered object set: server order from the initial list, new
/// objects appended as they appear.
#[derive(Default)]
struct Collection {
    items: FxHashMap<String, RawObject>,
    order: Vec<String>,
}

impl Collection {
    fn upsert(&mut self, key: String, raw: RawObject) {
        if !self.items.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.items.insert(key, raw);
    }

    fn remove(&mut self, key: &str) {
        if self.items.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }

    fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    fn snapshot(&self) -> Vec<RawObject> {
        self.order
            .iter()
            .filter_map(|k| self.items.get(k).cloned())
            .collect()
    }

    fn absorb_list(&mut self, objs: &[DynamicObject], desc: &ResourceDescriptor) {
        self.clear();
        for obj in objs {
            match normalize(obj, desc) {
                Ok((key, raw)) => self.upsert(key, raw),
                Err(e) => warn!(error = %e, "kube: skipping unserializable object"),
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for KubeTransport {
    async fn list(
        &self,
        desc: Arc<ResourceDescriptor>,
        scope: NamespaceScope,
        tx: mpsc::Sender<ListDelivery>,
    ) -> Result<()> {
        let watch_api = self.api_for(&desc, &scope);
        let list_api = self.api_for(&desc, &scope);
        let mut coll = Collection::default();

        // Prime with a full list so the first delivery lands fast.
        match list_api.list(&ListParams::default()).await {
            Ok(list) => {
                coll.absorb_list(&list.items, &desc);
                if tx.send(Ok(coll.snapshot())).await.is_err() {
                    return Ok(());
                }
            }
            Err(e) => {
                if tx
                    .send(Err(VantageError::Transport(e.to_string())))
                    .await
                    .is_err()
                {
                    return Ok(());
                }
            }
        }

        let stream = watcher::watcher(watch_api, watcher::Config::default());
        futures::pin_mut!(stream);
        let relist = Duration::from_secs(crate::relist_secs());
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + relist, relist);
        info!(gvk = %desc.gvk_key(), scope = %scope, "kube: list feed started");
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                _ = ticker.tick() => {
                    match list_api.list(&ListParams::default()).await {
                        Ok(list) => {
                            debug!(gvk = %desc.gvk_key(), items = list.items.len(), "kube: relist");
                            coll.absorb_list(&list.items, &desc);
                            if tx.send(Ok(coll.snapshot())).await.is_err() { break; }
                        }
                        Err(e) => {
                            if tx.send(Err(VantageError::Transport(e.to_string()))).await.is_err() { break; }
                        }
                    }
                }
                ev = stream.next() => match ev {
                    None => break,
                    Some(Ok(Event::Applied(obj))) => {
                        match normalize(&obj, &desc) {
                            Ok((key, raw)) => coll.upsert(key, raw),
                            Err(e) => { warn!(error = %e, "kube: skipping unserializable object"); continue; }
                        }
                        if tx.send(Ok(coll.snapshot())).await.is_err() { break; }
                    }
                    Some(Ok(Event::Deleted(obj))) => {
                        match normalize(&obj, &desc) {
                            Ok((key, _)) => coll.remove(&key),
                            Err(e) => { warn!(error = %e, "kube: skipping unserializable object"); continue; }
                        }
                        if tx.send(Ok(coll.snapshot())).await.is_err() { break; }
                    }
                    Some(Ok(Event::Restarted(objs))) => {
                        debug!(gvk = %desc.gvk_key(), count = objs.len(), "kube: watch restart");
                        coll.absorb_list(&objs, &desc);
                        if tx.send(Ok(coll.snapshot())).await.is_err() { break; }
                    }
                    // Transient watch failures keep the feed alive.
                    Some(Err(e)) => {
                        if tx.send(Err(VantageError::Transport(e.to_string()))).await.is_err() { break; }
                    }
                }
            }
        }
        info!(gvk = %desc.gvk_key(), "kube: list feed ended");
        Ok(())
    }

    async fn get(
        &self,
        desc: Arc<ResourceDescriptor>,
        name: String,
        scope: NamespaceScope,
        tx: mpsc::Sender<GetDelivery>,
    ) -> Result<()> {
        let api = self.api_for(&desc, &scope);
        match api.get(&name).await {
            Ok(obj) => match normalize(&obj, &desc) {
                Ok((_, raw)) => {
                    if tx.send(Ok(raw)).await.is_err() {
                        return Ok(());
                    }
                }
                Err(e) => warn!(error = %e, "kube: skipping unserializable object"),
            },
            Err(e) => {
                if tx
                    .send(Err(VantageError::Transport(e.to_string())))
                    .await
                    .is_err()
                {
                    return Ok(());
                }
            }
        }

        let cfg = watcher::Config::default().fields(&format!("metadata.name={}", name));
        let stream = watcher::watcher(self.api_for(&desc, &scope), cfg);
        futures::pin_mut!(stream);
        info!(gvk = %desc.gvk_key(), name = %name, "kube: get feed started");
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                ev = stream.next() => match ev {
                    None => break,
                    Some(Ok(Event::Applied(obj))) => {
                        match normalize(&obj, &desc) {
                            Ok((_, raw)) => {
                                if tx.send(Ok(raw)).await.is_err() { break; }
                            }
                            Err(e) => warn!(error = %e, "kube: skipping unserializable object"),
                        }
                    }
                    Some(Ok(Event::Deleted(_))) => {
                        debug!(gvk = %desc.gvk_key(), name = %name, "kube: watched object deleted");
                    }
                    Some(Ok(Event::Restarted(objs))) => {
                        if let Some(obj) = objs.iter().find(|o| o.metadata.name.as_deref() == Some(name.as_str())) {
                            match normalize(obj, &desc) {
                                Ok((_, raw)) => {
                                    if tx.send(Ok(raw)).await.is_err() { break; }
                                }
                                Err(e) => warn!(error = %e, "kube: skipping unserializable object"),
                            }
                        }
                    }
                    Some(Err(e)) => {
                        if tx.send(Err(VantageError::Transport(e.to_string()))).await.is_err() { break; }
                    }
                }
            }
        }
        info!(gvk = %desc.gvk_key(), name = %name, "kube: get feed ended");
        Ok(())
    }
}
