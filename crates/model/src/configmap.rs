//! ConfigMap wrapper.

#![forbid(unsafe_code)]

use crate::{kind_wrapper, KubeResource};

kind_wrapper!(ConfigMap, "ConfigMap");

impl ConfigMap {
    /// The `data` payload, if present.
    pub fn data(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.object().raw().get("data").and_then(|v| v.as_object())
    }
}
