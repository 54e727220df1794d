//! Runtime-addressed wrapper for extension kinds (CRs, plugin kinds).

#![forbid(unsafe_code)]

use smallvec::SmallVec;

use vantage_core::{RawObject, Uid, VantageResult};

use crate::KubeObject;

/// Wrapper for any registered kind addressed by name at runtime, for kinds
/// that have no dedicated wrapper type.
#[derive(Debug, Clone)]
pub struct DynamicResource {
    obj: KubeObject,
}

impl DynamicResource {
    /// Wrap one raw payload using the registered descriptor for `kind`.
    pub fn wrap_kind(kind: &str, raw: RawObject) -> VantageResult<Self> {
        let desc = vantage_registry::lookup(kind)?;
        KubeObject::from_raw(desc, raw).map(|obj| Self { obj })
    }

    pub fn object(&self) -> &KubeObject {
        &self.obj
    }

    pub fn kind(&self) -> &str {
        &self.obj.descriptor().kind
    }

    pub fn name(&self) -> &str {
        self.obj.name()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.obj.namespace()
    }

    pub fn uid(&self) -> Option<Uid> {
        self.obj.uid()
    }

    pub fn age(&self) -> String {
        self.obj.age()
    }

    pub fn labels(&self) -> SmallVec<[(String, String); 8]> {
        self.obj.labels()
    }

    pub fn details_link(&self) -> VantageResult<String> {
        self.obj.details_link()
    }

    pub fn spec(&self) -> Option<&RawObject> {
        self.obj.spec()
    }

    pub fn status(&self) -> Option<&RawObject> {
        self.obj.status()
    }
}
