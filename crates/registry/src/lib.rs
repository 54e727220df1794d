//! Kind descriptors, the process-wide kind table, and route rendering.
//!
//! The table is initialized once at startup (built-ins plus whatever
//! extension kinds plugins register) and read-only afterwards; writes are
//! rare and single-writer by convention.

#![forbid(unsafe_code)]

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use vantage_core::{VantageError, VantageResult};

pub mod builtins;
mod routes;

pub use routes::{register_route, route_url};

/// Static per-kind routing/API metadata. One per kind, shared by every
/// wrapper and endpoint of that kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    pub namespaced: bool,
    pub details_route: String,
    pub list_route: String,
}

impl ResourceDescriptor {
    pub fn gvk_key(&self) -> String {
        if self.group.is_empty() {
            format!("{}/{}", self.version, self.kind)
        } else {
            format!("{}/{}/{}", self.group, self.version, self.kind)
        }
    }

    /// "v1" for the core group, "apps/v1" otherwise.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// REST collection base for this kind, e.g. "/api/v1/pods" or
    /// "/apis/apps/v1/statefulsets".
    pub fn api_base(&self) -> String {
        if self.group.is_empty() {
            format!("/api/{}/{}", self.version, self.plural)
        } else {
            format!("/apis/{}/{}/{}", self.group, self.version, self.plural)
        }
    }
}

static KINDS: Lazy<RwLock<FxHashMap<String, Arc<ResourceDescriptor>>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

/// Register a kind, keyed by its kind name. Re-registering an identical
/// descriptor is a no-op; a conflicting descriptor is refused.
pub fn register_kind(desc: ResourceDescriptor) -> VantageResult<Arc<ResourceDescriptor>> {
    let mut map = KINDS.write().unwrap();
    if let Some(existing) = map.get(&desc.kind) {
        if **existing == desc {
            return Ok(existing.clone());
        }
        return Err(VantageError::DuplicateKind(desc.kind));
    }
    let shared = Arc::new(desc);
    map.insert(shared.kind.clone(), shared.clone());
    debug!(kind = %shared.kind, gvk = %shared.gvk_key(), "registry: kind registered");
    Ok(shared)
}

/// Register a kind together with default details/list route patterns derived
/// from its plural name. Used for built-ins and for extension kinds (CRDs)
/// that bring no route table of their own.
pub fn register_kind_with_default_routes(
    desc: ResourceDescriptor,
) -> VantageResult<Arc<ResourceDescriptor>> {
    let details = if desc.namespaced {
        format!("/{}/:namespace/:name", desc.plural)
    } else {
        format!("/{}/:name", desc.plural)
    };
    register_route(&desc.details_route, &details);
    register_route(&desc.list_route, &format!("/{}", desc.plural));
    register_kind(desc)
}

/// Look up the shared descriptor for a kind name.
pub fn lookup(kind: &str) -> VantageResult<Arc<ResourceDescriptor>> {
    KINDS
        .read()
        .unwrap()
        .get(kind)
        .cloned()
        .ok_or_else(|| VantageError::UnknownKind(kind.to_string()))
}

/// All registered kind names, sorted.
pub fn registered_kinds() -> Vec<String> {
    let mut out: Vec<String> = KINDS.read().unwrap().keys().cloned().collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(kind: &str, namespaced: bool) -> ResourceDescriptor {
        ResourceDescriptor {
            group: "testing.vantage.dev".into(),
            version: "v1".into(),
            kind: kind.into(),
            plural: format!("{}s", kind.to_lowercase()),
            namespaced,
            details_route: kind.to_lowercase(),
            list_route: format!("{}s", kind.to_lowercase()),
        }
    }

    #[test]
    fn lookup_unknown_kind_fails() {
        let err = lookup("NoSuchKind").unwrap_err();
        assert!(matches!(err, VantageError::UnknownKind(_)));
    }

    #[test]
    fn identical_reregistration_is_a_noop() {
        register_kind(desc("Widget", true)).unwrap();
        let again = register_kind(desc("Widget", true)).unwrap();
        assert_eq!(again.kind, "Widget");
        assert_eq!(lookup("Widget").unwrap().plural, "widgets");
    }

    #[test]
    fn conflicting_reregistration_is_refused() {
        register_kind(desc("Gadget", true)).unwrap();
        let err = register_kind(desc("Gadget", false)).unwrap_err();
        assert!(matches!(err, VantageError::DuplicateKind(_)));
        // The original registration survives.
        assert!(lookup("Gadget").unwrap().namespaced);
    }

    #[test]
    fn api_base_distinguishes_core_group() {
        let core = ResourceDescriptor {
            group: String::new(),
            version: "v1".into(),
            kind: "Pod".into(),
            plural: "pods".into(),
            namespaced: true,
            details_route: "pod".into(),
            list_route: "pods".into(),
        };
        assert_eq!(core.api_base(), "/api/v1/pods");
        assert_eq!(core.gvk_key(), "v1/Pod");
        assert_eq!(core.api_version(), "v1");

        let grouped = desc("Widget", true);
        assert_eq!(grouped.api_base(), "/apis/testing.vantage.dev/v1/widgets");
        assert_eq!(grouped.gvk_key(), "testing.vantage.dev/v1/Widget");
    }
}
