//! Service wrapper.

#![forbid(unsafe_code)]

use crate::{kind_wrapper, KubeResource};

kind_wrapper!(Service, "Service");

impl Service {
    pub fn service_type(&self) -> &str {
        self.object()
            .raw()
            .pointer("/spec/type")
            .and_then(|v| v.as_str())
            .unwrap_or("ClusterIP")
    }

    pub fn cluster_ip(&self) -> Option<&str> {
        self.object()
            .raw()
            .pointer("/spec/clusterIP")
            .and_then(|v| v.as_str())
    }

    /// Ports rendered as "80/TCP" strings.
    pub fn ports(&self) -> Vec<String> {
        self.object()
            .raw()
            .pointer("/spec/ports")
            .and_then(|v| v.as_array())
            .map(|ps| {
                ps.iter()
                    .map(|p| {
                        let port = p.get("port").and_then(|n| n.as_u64()).unwrap_or(0);
                        let proto = p.get("protocol").and_then(|s| s.as_str()).unwrap_or("TCP");
                        format!("{}/{}", port, proto)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
