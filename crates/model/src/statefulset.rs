//! StatefulSet wrapper.

#![forbid(unsafe_code)]

use crate::{kind_wrapper, KubeResource};

kind_wrapper!(StatefulSet, "StatefulSet");

impl StatefulSet {
    pub fn replicas(&self) -> u64 {
        self.object()
            .raw()
            .pointer("/spec/replicas")
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }

    pub fn ready_replicas(&self) -> u64 {
        self.object()
            .raw()
            .pointer("/status/readyReplicas")
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }
}
