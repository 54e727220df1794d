//! Secret wrapper.

#![forbid(unsafe_code)]

use crate::{kind_wrapper, KubeResource};

kind_wrapper!(Secret, "Secret");

impl Secret {
    /// Base64-encoded `data` entries, as delivered.
    pub fn data(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.object().raw().get("data").and_then(|v| v.as_object())
    }

    pub fn secret_type(&self) -> &str {
        self.object()
            .raw()
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}
