//! Built-in kind set mirrored from the core API groups.

#![forbid(unsafe_code)]

use crate::{register_kind_with_default_routes, ResourceDescriptor};
use vantage_core::VantageResult;

// (group, version, kind, plural, namespaced, details route)
const BUILTINS: &[(&str, &str, &str, &str, bool, &str)] = &[
    ("", "v1", "Pod", "pods", true, "pod"),
    ("", "v1", "Service", "services", true, "service"),
    ("", "v1", "ConfigMap", "configmaps", true, "configMap"),
    ("", "v1", "Secret", "secrets", true, "secret"),
    ("", "v1", "Namespace", "namespaces", false, "namespace"),
    ("", "v1", "Node", "nodes", false, "node"),
    ("", "v1", "PersistentVolumeClaim", "persistentvolumeclaims", true, "pvc"),
    ("apps", "v1", "Deployment", "deployments", true, "deployment"),
    ("apps", "v1", "StatefulSet", "statefulsets", true, "statefulSet"),
    ("apps", "v1", "DaemonSet", "daemonsets", true, "daemonSet"),
    ("networking.k8s.io", "v1", "Ingress", "ingresses", true, "ingress"),
    (
        "apiextensions.k8s.io",
        "v1",
        "CustomResourceDefinition",
        "customresourcedefinitions",
        false,
        "crd",
    ),
];

/// Register every built-in kind and its routes. Idempotent, so callers can
/// invoke it unconditionally during startup.
pub fn register_builtins() -> VantageResult<()> {
    for (group, version, kind, plural, namespaced, route) in BUILTINS {
        register_kind_with_default_routes(ResourceDescriptor {
            group: (*group).to_string(),
            version: (*version).to_string(),
            kind: (*kind).to_string(),
            plural: (*plural).to_string(),
            namespaced: *namespaced,
            details_route: (*route).to_string(),
            list_route: format!("{}s", route),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lookup, route_url};

    #[test]
    fn builtins_register_and_resolve() {
        register_builtins().unwrap();
        register_builtins().unwrap(); // idempotent

        let cm = lookup("ConfigMap").unwrap();
        assert!(cm.namespaced);
        assert_eq!(cm.api_base(), "/api/v1/configmaps");

        let sts = lookup("StatefulSet").unwrap();
        assert_eq!(sts.api_base(), "/apis/apps/v1/statefulsets");

        let node = lookup("Node").unwrap();
        assert!(!node.namespaced);
        assert_eq!(route_url(&node.details_route, None, "worker-1").unwrap(), "/nodes/worker-1");
        assert_eq!(
            route_url(&cm.details_route, Some("default"), "my-config").unwrap(),
            "/configmaps/default/my-config"
        );
    }
}
