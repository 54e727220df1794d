//! Ingress wrapper.

#![forbid(unsafe_code)]

use crate::{kind_wrapper, KubeResource};

kind_wrapper!(Ingress, "Ingress");

impl Ingress {
    /// Hosts across all rules, in rule order.
    pub fn hosts(&self) -> Vec<String> {
        self.object()
            .raw()
            .pointer("/spec/rules")
            .and_then(|v| v.as_array())
            .map(|rs| {
                rs.iter()
                    .filter_map(|r| r.get("host").and_then(|h| h.as_str()))
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}
