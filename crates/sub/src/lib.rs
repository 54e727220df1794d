//! Subscription plumbing: endpoint construction, transports, cancellable
//! handles, and latest-snapshot cells.

#![forbid(unsafe_code)]

pub mod cell;
pub mod endpoint;
mod kube_transport;
pub mod manager;
mod manual;
pub mod transport;

pub use cell::{ObjectCell, SnapshotCell};
pub use endpoint::{Endpoints, GetOp, ListOp};
pub use kube_transport::KubeTransport;
pub use manager::{
    Binding, GetUpdate, ListUpdate, SubscriptionHandle, SubscriptionManager, SubscriptionSet,
};
pub use manual::ManualTransport;
pub use transport::{GetDelivery, ListDelivery, Transport};

/// Delivery queue capacity (`VANTAGE_QUEUE_CAP`, default 2048).
pub(crate) fn queue_cap() -> usize {
    std::env::var("VANTAGE_QUEUE_CAP")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(2048)
}

/// Periodic relist interval for the kube transport
/// (`VANTAGE_RELIST_SECS`, default 300).
pub(crate) fn relist_secs() -> u64 {
    std::env::var("VANTAGE_RELIST_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(300)
}
