//! Node wrapper.

#![forbid(unsafe_code)]

use crate::{kind_wrapper, KubeResource};

kind_wrapper!(Node, "Node");

impl Node {
    pub fn kubelet_version(&self) -> &str {
        self.object()
            .raw()
            .pointer("/status/nodeInfo/kubeletVersion")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    /// True when the Ready condition reports "True".
    pub fn ready(&self) -> bool {
        self.object()
            .raw()
            .pointer("/status/conditions")
            .and_then(|v| v.as_array())
            .map(|cs| {
                cs.iter().any(|c| {
                    c.get("type").and_then(|t| t.as_str()) == Some("Ready")
                        && c.get("status").and_then(|s| s.as_str()) == Some("True")
                })
            })
            .unwrap_or(false)
    }

    /// (type, address) pairs from `status.addresses`.
    pub fn addresses(&self) -> Vec<(String, String)> {
        self.object()
            .raw()
            .pointer("/status/addresses")
            .and_then(|v| v.as_array())
            .map(|xs| {
                xs.iter()
                    .filter_map(|a| {
                        let ty = a.get("type").and_then(|t| t.as_str())?;
                        let addr = a.get("address").and_then(|s| s.as_str())?;
                        Some((ty.to_string(), addr.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
