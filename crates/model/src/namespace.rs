//! Namespace wrapper.

#![forbid(unsafe_code)]

use crate::{kind_wrapper, KubeResource};

kind_wrapper!(Namespace, "Namespace");

impl Namespace {
    pub fn phase(&self) -> &str {
        self.object()
            .raw()
            .pointer("/status/phase")
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}
