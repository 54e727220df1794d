//! Transport seam: how raw payload deliveries enter the core.

#![forbid(unsafe_code)]

use std::sync::Arc;

use tokio::sync::mpsc;

use vantage_core::{NamespaceScope, RawObject, VantageError};
use vantage_registry::ResourceDescriptor;

/// One list delivery: a full snapshot of raw payloads, or a transport error.
pub type ListDelivery = Result<Vec<RawObject>, VantageError>;

/// One get delivery: a single raw payload, or a transport error.
pub type GetDelivery = Result<RawObject, VantageError>;

/// External fetch/watch collaborator.
///
/// Implementations push zero or more deliveries into `tx` and return once
/// the stream ends or the receiver is dropped. Mid-stream failures travel as
/// `Err` items so a feed survives transient faults; the returned `Result`
/// reports only setup-level breakage.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn list(
        &self,
        desc: Arc<ResourceDescriptor>,
        scope: NamespaceScope,
        tx: mpsc::Sender<ListDelivery>,
    ) -> anyhow::Result<()>;

    async fn get(
        &self,
        desc: Arc<ResourceDescriptor>,
        name: String,
        scope: NamespaceScope,
        tx: mpsc::Sender<GetDelivery>,
    ) -> anyhow::Result<()>;
}
