//! Typed wrappers over raw cluster objects.
//!
//! One wrapper type per kind over a shared `KubeObject` base. Wrappers are
//! read views: they hold the payload as delivered and never mutate it.

#![forbid(unsafe_code)]

use std::sync::Arc;

use smallvec::SmallVec;

use vantage_core::{time, RawObject, Uid, VantageError, VantageResult};
use vantage_registry::ResourceDescriptor;

mod configmap;
mod crd;
mod dynamic;
mod ingress;
mod namespace;
mod node;
mod pod;
pub mod reconcile;
mod secret;
mod service;
mod statefulset;

pub use configmap::ConfigMap;
pub use crd::CustomResourceDefinition;
pub use dynamic::DynamicResource;
pub use ingress::Ingress;
pub use namespace::Namespace;
pub use node::Node;
pub use pod::Pod;
pub use secret::Secret;
pub use service::Service;
pub use statefulset::StatefulSet;

/// Generic wrapper around one raw object of a known kind.
#[derive(Debug, Clone)]
pub struct KubeObject {
    desc: Arc<ResourceDescriptor>,
    raw: RawObject,
}

impl KubeObject {
    /// Wrap a raw payload. Fails only when `kind` or `metadata.name` is
    /// absent or empty; missing optional fields never fail construction.
    pub fn from_raw(desc: Arc<ResourceDescriptor>, raw: RawObject) -> VantageResult<Self> {
        let kind = raw.get("kind").and_then(|v| v.as_str()).unwrap_or("");
        if kind.is_empty() {
            return Err(VantageError::MalformedResource("missing kind".into()));
        }
        if kind != desc.kind {
            return Err(VantageError::MalformedResource(format!(
                "kind {} does not match descriptor {}",
                kind, desc.kind
            )));
        }
        let name = raw
            .pointer("/metadata/name")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        if name.is_empty() {
            return Err(VantageError::MalformedResource(format!(
                "{}: missing metadata.name",
                kind
            )));
        }
        Ok(Self { desc, raw })
    }

    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.desc
    }

    pub fn raw(&self) -> &RawObject {
        &self.raw
    }

    pub fn name(&self) -> &str {
        self.raw
            .pointer("/metadata/name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.raw
            .pointer("/metadata/namespace")
            .and_then(|v| v.as_str())
    }

    pub fn uid(&self) -> Option<Uid> {
        let s = self.raw.pointer("/metadata/uid")?.as_str()?;
        uuid::Uuid::parse_str(s).ok().map(|u| *u.as_bytes())
    }

    pub fn resource_version(&self) -> Option<&str> {
        self.raw
            .pointer("/metadata/resourceVersion")
            .and_then(|v| v.as_str())
    }

    /// `metadata.creationTimestamp` as epoch seconds (0 when absent).
    pub fn creation_ts(&self) -> i64 {
        time::parse_creation_ts(
            self.raw
                .pointer("/metadata/creationTimestamp")
                .and_then(|v| v.as_str()),
        )
    }

    /// Relative age against now. Pure derivation, recomputed per call.
    pub fn age(&self) -> String {
        time::render_age(self.creation_ts())
    }

    /// Relative age at an explicit `now`, for deterministic rendering.
    pub fn age_at(&self, now: i64) -> String {
        time::render_age_at(self.creation_ts(), now)
    }

    pub fn labels(&self) -> SmallVec<[(String, String); 8]> {
        let mut out = SmallVec::new();
        if let Some(map) = self.raw.pointer("/metadata/labels").and_then(|m| m.as_object()) {
            for (k, v) in map.iter() {
                if let Some(val) = v.as_str() {
                    out.push((k.clone(), val.to_string()));
                }
            }
        }
        out
    }

    pub fn annotations(&self) -> SmallVec<[(String, String); 4]> {
        let mut out = SmallVec::new();
        if let Some(map) = self
            .raw
            .pointer("/metadata/annotations")
            .and_then(|m| m.as_object())
        {
            for (k, v) in map.iter() {
                if let Some(val) = v.as_str() {
                    out.push((k.clone(), val.to_string()));
                }
            }
        }
        out
    }

    /// Details route for this object. A namespaced kind without a namespace
    /// cannot be routed.
    pub fn details_link(&self) -> VantageResult<String> {
        let ns = self.namespace();
        if self.desc.namespaced && ns.is_none() {
            return Err(VantageError::Routing(format!(
                "{} {} has no namespace",
                self.desc.kind,
                self.name()
            )));
        }
        vantage_registry::route_url(&self.desc.details_route, ns, self.name())
    }

    pub fn spec(&self) -> Option<&RawObject> {
        self.raw.get("spec")
    }

    pub fn status(&self) -> Option<&RawObject> {
        self.raw.get("status")
    }
}

/// Capability set shared by every kind wrapper: identity, age, details link,
/// plus whatever accessors the concrete type adds.
pub trait KubeResource: Sized {
    /// Kind name this wrapper binds to, as registered in the kind table.
    const KIND: &'static str;

    fn object(&self) -> &KubeObject;
    fn from_object(obj: KubeObject) -> Self;

    /// Wrap one raw payload using the registered descriptor for `KIND`.
    fn wrap(raw: RawObject) -> VantageResult<Self> {
        let desc = vantage_registry::lookup(Self::KIND)?;
        KubeObject::from_raw(desc, raw).map(Self::from_object)
    }

    fn name(&self) -> &str {
        self.object().name()
    }
    fn namespace(&self) -> Option<&str> {
        self.object().namespace()
    }
    fn uid(&self) -> Option<Uid> {
        self.object().uid()
    }
    fn resource_version(&self) -> Option<&str> {
        self.object().resource_version()
    }
    fn creation_ts(&self) -> i64 {
        self.object().creation_ts()
    }
    fn age(&self) -> String {
        self.object().age()
    }
    fn labels(&self) -> SmallVec<[(String, String); 8]> {
        self.object().labels()
    }
    fn annotations(&self) -> SmallVec<[(String, String); 4]> {
        self.object().annotations()
    }
    fn details_link(&self) -> VantageResult<String> {
        self.object().details_link()
    }
}

/// Declare a kind wrapper: the struct plus its `KubeResource` plumbing.
/// Kind-specific accessors are added in ordinary `impl` blocks.
#[macro_export]
macro_rules! kind_wrapper {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            obj: $crate::KubeObject,
        }

        impl $crate::KubeResource for $name {
            const KIND: &'static str = $kind;

            fn object(&self) -> &$crate::KubeObject {
                &self.obj
            }

            fn from_object(obj: $crate::KubeObject) -> Self {
                Self { obj }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn desc(kind: &str, namespaced: bool) -> Arc<ResourceDescriptor> {
        Arc::new(ResourceDescriptor {
            group: String::new(),
            version: "v1".into(),
            kind: kind.into(),
            plural: format!("{}s", kind.to_lowercase()),
            namespaced,
            details_route: kind.to_lowercase(),
            list_route: format!("{}s", kind.to_lowercase()),
        })
    }

    fn raw(name: &str) -> serde_json::Value {
        json!({
            "kind": "Widget",
            "apiVersion": "v1",
            "metadata": {
                "name": name,
                "namespace": "default",
                "uid": "00000000-0000-0000-0000-000000000001",
                "resourceVersion": "7",
                "creationTimestamp": "2024-01-01T00:00:00Z",
                "labels": {"app": "demo"},
                "annotations": {"owner": "team-a"}
            },
            "spec": {"replicas": 2},
            "status": {"phase": "Ready"}
        })
    }

    #[test]
    fn wrap_roundtrips_identity() {
        let obj = KubeObject::from_raw(desc("Widget", true), raw("w1")).unwrap();
        assert_eq!(obj.name(), "w1");
        assert_eq!(obj.namespace(), Some("default"));
        assert_eq!(obj.resource_version(), Some("7"));
        assert_eq!(obj.uid().unwrap()[15], 1);
        assert_eq!(obj.creation_ts(), 1_704_067_200);
        assert_eq!(obj.age_at(1_704_067_200 + 90), "1m");
        assert_eq!(obj.labels().as_slice(), &[("app".to_string(), "demo".to_string())]);
        assert_eq!(obj.spec().unwrap()["replicas"], 2);
        assert_eq!(obj.status().unwrap()["phase"], "Ready");
    }

    #[test]
    fn missing_name_is_malformed() {
        let payload = json!({"kind": "Widget", "metadata": {"namespace": "default"}});
        let err = KubeObject::from_raw(desc("Widget", true), payload).unwrap_err();
        assert!(matches!(err, VantageError::MalformedResource(_)));
    }

    #[test]
    fn missing_kind_is_malformed() {
        let payload = json!({"metadata": {"name": "w1"}});
        let err = KubeObject::from_raw(desc("Widget", true), payload).unwrap_err();
        assert!(matches!(err, VantageError::MalformedResource(_)));
    }

    #[test]
    fn mismatched_kind_is_malformed() {
        let payload = json!({"kind": "Gizmo", "metadata": {"name": "g1"}});
        let err = KubeObject::from_raw(desc("Widget", true), payload).unwrap_err();
        assert!(matches!(err, VantageError::MalformedResource(_)));
    }

    #[test]
    fn missing_optionals_do_not_fail_construction() {
        let payload = json!({"kind": "Widget", "metadata": {"name": "bare"}});
        let obj = KubeObject::from_raw(desc("Widget", true), payload).unwrap();
        assert_eq!(obj.namespace(), None);
        assert_eq!(obj.creation_ts(), 0);
        assert_eq!(obj.age_at(1_000), "-");
        assert!(obj.labels().is_empty());
        assert!(obj.uid().is_none());
    }

    #[test]
    fn details_link_requires_namespace_for_namespaced_kinds() {
        vantage_registry::register_route("widget", "/widgets/:namespace/:name");
        let ok = KubeObject::from_raw(desc("Widget", true), raw("w1")).unwrap();
        assert_eq!(ok.details_link().unwrap(), "/widgets/default/w1");

        let payload = json!({"kind": "Widget", "metadata": {"name": "w2"}});
        let bad = KubeObject::from_raw(desc("Widget", true), payload).unwrap();
        assert!(matches!(bad.details_link().unwrap_err(), VantageError::Routing(_)));
    }
}
