//! Pod wrapper.

#![forbid(unsafe_code)]

use crate::{kind_wrapper, KubeResource};

kind_wrapper!(Pod, "Pod");

impl Pod {
    pub fn phase(&self) -> &str {
        self.object()
            .raw()
            .pointer("/status/phase")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    pub fn node_name(&self) -> Option<&str> {
        self.object()
            .raw()
            .pointer("/spec/nodeName")
            .and_then(|v| v.as_str())
    }

    pub fn container_names(&self) -> Vec<String> {
        self.object()
            .raw()
            .pointer("/spec/containers")
            .and_then(|v| v.as_array())
            .map(|cs| {
                cs.iter()
                    .filter_map(|c| c.get("name").and_then(|n| n.as_str()))
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sum of restart counts across container statuses.
    pub fn restart_count(&self) -> u64 {
        self.object()
            .raw()
            .pointer("/status/containerStatuses")
            .and_then(|v| v.as_array())
            .map(|cs| {
                cs.iter()
                    .filter_map(|c| c.get("restartCount").and_then(|n| n.as_u64()))
                    .sum()
            })
            .unwrap_or(0)
    }
}
