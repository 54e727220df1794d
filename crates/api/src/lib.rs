//! Vantage public façade (in-process).
//!
//! Ties the kind table, typed wrappers and subscription plumbing together
//! behind the one entry point frontends depend on.

#![forbid(unsafe_code)]

use std::sync::Arc;

use tracing::warn;

pub use vantage_core::{NamespaceScope, RawObject, Uid, VantageError, VantageResult};
pub use vantage_model::reconcile::{reconcile, reconcile_with};
pub use vantage_model::{
    ConfigMap, CustomResourceDefinition, DynamicResource, Ingress, KubeObject, KubeResource,
    Namespace, Node, Pod, Secret, Service, StatefulSet,
};
pub use vantage_registry::{
    builtins::register_builtins, lookup, register_kind_with_default_routes, register_route,
    registered_kinds, route_url, ResourceDescriptor,
};
pub use vantage_sub::{
    Binding, Endpoints, GetOp, GetUpdate, KubeTransport, ListOp, ListUpdate, ManualTransport,
    ObjectCell, SnapshotCell, SubscriptionHandle, SubscriptionManager, SubscriptionSet, Transport,
};

/// In-process entry point over one transport.
#[derive(Clone)]
pub struct Vantage {
    manager: SubscriptionManager,
}

impl Vantage {
    /// Build over any transport; the built-in kinds are registered as a
    /// side effect so subscriptions work immediately.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        if let Err(e) = register_builtins() {
            warn!(error = %e, "api: built-in registration conflict");
        }
        Self {
            manager: SubscriptionManager::new(transport),
        }
    }

    /// Connect with the default kubeconfig/in-cluster config.
    pub async fn try_default() -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(KubeTransport::try_default().await?)))
    }

    pub fn manager(&self) -> &SubscriptionManager {
        &self.manager
    }

    /// Wrap one raw payload as `W`.
    pub fn wrap<W: KubeResource>(raw: RawObject) -> VantageResult<W> {
        W::wrap(raw)
    }

    /// Wrap one raw payload of a runtime-addressed kind.
    pub fn wrap_kind(kind: &str, raw: RawObject) -> VantageResult<DynamicResource> {
        DynamicResource::wrap_kind(kind, raw)
    }

    /// Register an extension kind (CRDs, plugin kinds) before subscribing
    /// to it. Conflicting re-registration is refused.
    pub fn register_kind(&self, desc: ResourceDescriptor) -> VantageResult<Arc<ResourceDescriptor>> {
        register_kind_with_default_routes(desc)
    }

    /// Register the kind a CRD serves, straight from the CRD object.
    pub fn register_crd(
        &self,
        crd: &CustomResourceDefinition,
    ) -> VantageResult<Arc<ResourceDescriptor>> {
        self.register_kind(crd.served_descriptor()?)
    }

    /// Subscribe to the collection of `W` under `scope`. Every delivery
    /// replaces the previous snapshot wholesale.
    pub fn subscribe_list<W, H>(
        &self,
        scope: NamespaceScope,
        handler: H,
    ) -> VantageResult<SubscriptionHandle>
    where
        W: KubeResource + Send + Sync + 'static,
        H: FnMut(ListUpdate<W>) + Send + 'static,
    {
        let op = Endpoints::for_kind(W::KIND)?.list_op(scope)?;
        Ok(self.manager.subscribe_list(op, W::wrap, handler))
    }

    /// Subscribe to one object of kind `W`.
    pub fn subscribe_one<W, H>(
        &self,
        name: &str,
        scope: NamespaceScope,
        handler: H,
    ) -> VantageResult<SubscriptionHandle>
    where
        W: KubeResource + Send + Sync + 'static,
        H: FnMut(GetUpdate<W>) + Send + 'static,
    {
        let op = Endpoints::for_kind(W::KIND)?.get_op(name, scope)?;
        Ok(self.manager.subscribe_one(op, W::wrap, handler))
    }

    /// Subscribe to the collection of a runtime-addressed kind.
    pub fn subscribe_list_kind<H>(
        &self,
        kind: &str,
        scope: NamespaceScope,
        handler: H,
    ) -> VantageResult<SubscriptionHandle>
    where
        H: FnMut(ListUpdate<DynamicResource>) + Send + 'static,
    {
        let op = Endpoints::for_kind(kind)?.list_op(scope)?;
        let kind = kind.to_string();
        Ok(self
            .manager
            .subscribe_list(op, move |raw| DynamicResource::wrap_kind(&kind, raw), handler))
    }

    /// Subscribe to one object of a runtime-addressed kind.
    pub fn subscribe_one_kind<H>(
        &self,
        kind: &str,
        name: &str,
        scope: NamespaceScope,
        handler: H,
    ) -> VantageResult<SubscriptionHandle>
    where
        H: FnMut(GetUpdate<DynamicResource>) + Send + 'static,
    {
        let op = Endpoints::for_kind(kind)?.get_op(name, scope)?;
        let kind = kind.to_string();
        Ok(self
            .manager
            .subscribe_one(op, move |raw| DynamicResource::wrap_kind(&kind, raw), handler))
    }
}
