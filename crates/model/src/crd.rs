//! CustomResourceDefinition wrapper and extension-kind descriptor derivation.

#![forbid(unsafe_code)]

use vantage_core::{VantageError, VantageResult};
use vantage_registry::ResourceDescriptor;

use crate::{kind_wrapper, KubeResource};

kind_wrapper!(CustomResourceDefinition, "CustomResourceDefinition");

impl CustomResourceDefinition {
    pub fn crd_group(&self) -> &str {
        self.object()
            .raw()
            .pointer("/spec/group")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    /// Descriptor for the version this CRD stores (else the first served
    /// one), ready to be fed into the kind table so instances of the custom
    /// kind can be listed and wrapped like any built-in.
    pub fn served_descriptor(&self) -> VantageResult<ResourceDescriptor> {
        let spec = self
            .object()
            .spec()
            .ok_or_else(|| VantageError::MalformedResource("crd missing spec".into()))?;
        let group = spec.get("group").and_then(|v| v.as_str()).unwrap_or("");
        let names = spec
            .get("names")
            .ok_or_else(|| VantageError::MalformedResource("crd missing spec.names".into()))?;
        let kind = names.get("kind").and_then(|v| v.as_str()).unwrap_or("");
        let plural = names.get("plural").and_then(|v| v.as_str()).unwrap_or("");
        if kind.is_empty() || plural.is_empty() {
            return Err(VantageError::MalformedResource(
                "crd names need kind and plural".into(),
            ));
        }
        let versions = spec.get("versions").and_then(|v| v.as_array());
        // Prefer storage=true, else first served=true, else the first entry.
        let version = versions
            .and_then(|vs| {
                vs.iter()
                    .find(|v| v.get("storage").and_then(|b| b.as_bool()).unwrap_or(false))
                    .or_else(|| {
                        vs.iter()
                            .find(|v| v.get("served").and_then(|b| b.as_bool()).unwrap_or(false))
                    })
                    .or_else(|| vs.first())
            })
            .and_then(|v| v.get("name"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| VantageError::MalformedResource("crd has no served version".into()))?;
        let namespaced = spec.get("scope").and_then(|v| v.as_str()) == Some("Namespaced");
        Ok(ResourceDescriptor {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
            plural: plural.to_string(),
            namespaced,
            details_route: kind.to_lowercase(),
            list_route: plural.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KubeObject;
    use serde_json::json;
    use std::sync::Arc;

    fn crd(spec: serde_json::Value) -> CustomResourceDefinition {
        let desc = Arc::new(ResourceDescriptor {
            group: "apiextensions.k8s.io".into(),
            version: "v1".into(),
            kind: "CustomResourceDefinition".into(),
            plural: "customresourcedefinitions".into(),
            namespaced: false,
            details_route: "crd".into(),
            list_route: "crds".into(),
        });
        let raw = json!({
            "kind": "CustomResourceDefinition",
            "metadata": {"name": "certificates.certs.example.com"},
            "spec": spec
        });
        CustomResourceDefinition::from_object(KubeObject::from_raw(desc, raw).unwrap())
    }

    #[test]
    fn storage_version_wins() {
        let c = crd(json!({
            "group": "certs.example.com",
            "scope": "Namespaced",
            "names": {"kind": "Certificate", "plural": "certificates"},
            "versions": [
                {"name": "v1alpha1", "served": true, "storage": false},
                {"name": "v1", "served": true, "storage": true}
            ]
        }));
        let d = c.served_descriptor().unwrap();
        assert_eq!(d.version, "v1");
        assert_eq!(d.kind, "Certificate");
        assert_eq!(d.plural, "certificates");
        assert!(d.namespaced);
        assert_eq!(d.api_base(), "/apis/certs.example.com/v1/certificates");
    }

    #[test]
    fn falls_back_to_first_served_version() {
        let c = crd(json!({
            "group": "certs.example.com",
            "scope": "Cluster",
            "names": {"kind": "Issuer", "plural": "issuers"},
            "versions": [
                {"name": "v1beta1", "served": false},
                {"name": "v1beta2", "served": true}
            ]
        }));
        let d = c.served_descriptor().unwrap();
        assert_eq!(d.version, "v1beta2");
        assert!(!d.namespaced);
    }

    #[test]
    fn missing_names_are_malformed() {
        let c = crd(json!({"group": "g", "scope": "Cluster", "versions": [{"name": "v1"}]}));
        assert!(matches!(
            c.served_descriptor().unwrap_err(),
            VantageError::MalformedResource(_)
        ));
    }
}
