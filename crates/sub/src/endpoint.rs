//! Endpoint construction: the one place the namespace dimension is enforced.
//!
//! Kinds differ only in whether namespace is a required routing dimension;
//! validating the scope here keeps every downstream consumer
//! namespace-agnostic.

#![forbid(unsafe_code)]

use std::sync::Arc;

use vantage_core::{NamespaceScope, VantageError, VantageResult};
use vantage_registry::ResourceDescriptor;

/// Operation constructors for one kind.
#[derive(Debug, Clone)]
pub struct Endpoints {
    desc: Arc<ResourceDescriptor>,
}

impl Endpoints {
    pub fn for_kind(kind: &str) -> VantageResult<Self> {
        Ok(Self {
            desc: vantage_registry::lookup(kind)?,
        })
    }

    pub fn from_descriptor(desc: Arc<ResourceDescriptor>) -> Self {
        Self { desc }
    }

    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.desc
    }

    /// List operation over the given scope.
    pub fn list_op(&self, scope: NamespaceScope) -> VantageResult<ListOp> {
        match (self.desc.namespaced, &scope) {
            (false, NamespaceScope::Cluster) => {}
            (false, other) => {
                return Err(VantageError::InvalidScope(format!(
                    "{} is cluster-scoped; got {}",
                    self.desc.kind, other
                )))
            }
            (true, NamespaceScope::Cluster) => {
                return Err(VantageError::InvalidScope(format!(
                    "{} is namespaced; a namespace scope is required",
                    self.desc.kind
                )))
            }
            (true, _) => {}
        }
        Ok(ListOp {
            desc: self.desc.clone(),
            scope,
        })
    }

    /// Get operation for one object. Namespaced kinds need a specific
    /// namespace; `All` does not address a single object.
    pub fn get_op(&self, name: &str, scope: NamespaceScope) -> VantageResult<GetOp> {
        match (self.desc.namespaced, &scope) {
            (false, NamespaceScope::Cluster) => {}
            (false, other) => {
                return Err(VantageError::InvalidScope(format!(
                    "{} is cluster-scoped; got {}",
                    self.desc.kind, other
                )))
            }
            (true, NamespaceScope::Namespace(_)) => {}
            (true, other) => {
                return Err(VantageError::InvalidScope(format!(
                    "{} get needs a specific namespace; got {}",
                    self.desc.kind, other
                )))
            }
        }
        Ok(GetOp {
            desc: self.desc.clone(),
            name: name.to_string(),
            scope,
        })
    }
}

/// Validated list operation: descriptor plus scope.
#[derive(Debug, Clone)]
pub struct ListOp {
    pub(crate) desc: Arc<ResourceDescriptor>,
    pub(crate) scope: NamespaceScope,
}

impl ListOp {
    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.desc
    }

    pub fn scope(&self) -> &NamespaceScope {
        &self.scope
    }
}

/// Validated get operation: descriptor, object name, scope.
#[derive(Debug, Clone)]
pub struct GetOp {
    pub(crate) desc: Arc<ResourceDescriptor>,
    pub(crate) name: String,
    pub(crate) scope: NamespaceScope,
}

impl GetOp {
    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.desc
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &NamespaceScope {
        &self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints(namespaced: bool) -> Endpoints {
        Endpoints::from_descriptor(Arc::new(ResourceDescriptor {
            group: String::new(),
            version: "v1".into(),
            kind: if namespaced { "ConfigMap" } else { "Node" }.into(),
            plural: if namespaced { "configmaps" } else { "nodes" }.into(),
            namespaced,
            details_route: "r".into(),
            list_route: "rs".into(),
        }))
    }

    #[test]
    fn namespaced_list_takes_all_or_specific() {
        let e = endpoints(true);
        assert!(e.list_op(NamespaceScope::All).is_ok());
        assert!(e.list_op(NamespaceScope::Namespace("default".into())).is_ok());
        assert!(matches!(
            e.list_op(NamespaceScope::Cluster).unwrap_err(),
            VantageError::InvalidScope(_)
        ));
    }

    #[test]
    fn cluster_scoped_list_rejects_any_namespace() {
        let e = endpoints(false);
        assert!(e.list_op(NamespaceScope::Cluster).is_ok());
        assert!(matches!(
            e.list_op(NamespaceScope::All).unwrap_err(),
            VantageError::InvalidScope(_)
        ));
        assert!(matches!(
            e.list_op(NamespaceScope::Namespace("default".into())).unwrap_err(),
            VantageError::InvalidScope(_)
        ));
    }

    #[test]
    fn get_needs_a_specific_namespace_for_namespaced_kinds() {
        let e = endpoints(true);
        assert!(e.get_op("x", NamespaceScope::Namespace("default".into())).is_ok());
        assert!(matches!(
            e.get_op("x", NamespaceScope::All).unwrap_err(),
            VantageError::InvalidScope(_)
        ));
        assert!(matches!(
            e.get_op("x", NamespaceScope::Cluster).unwrap_err(),
            VantageError::InvalidScope(_)
        ));

        let c = endpoints(false);
        assert!(c.get_op("x", NamespaceScope::Cluster).is_ok());
        assert!(matches!(
            c.get_op("x", NamespaceScope::Namespace("default".into())).unwrap_err(),
            VantageError::InvalidScope(_)
        ));
    }
}
