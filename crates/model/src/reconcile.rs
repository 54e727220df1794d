//! Full-snapshot reconciliation of list deliveries.

#![forbid(unsafe_code)]

use metrics::counter;
use tracing::{debug, warn};

use vantage_core::{RawObject, VantageResult};

use crate::KubeResource;

/// Replace `prev` wholesale with wrappers built from `raw_list`, preserving
/// server order. A malformed element is skipped and reported; it never
/// aborts the rest of the list. An empty `raw_list` yields an empty
/// sequence, which is a real snapshot, not "no data yet".
pub fn reconcile_with<T>(
    prev: Option<&[T]>,
    raw_list: Vec<RawObject>,
    wrap: impl Fn(RawObject) -> VantageResult<T>,
) -> Vec<T> {
    let mut next = Vec::with_capacity(raw_list.len());
    let mut skipped = 0usize;
    for raw in raw_list {
        match wrap(raw) {
            Ok(w) => next.push(w),
            Err(e) => {
                skipped += 1;
                warn!(error = %e, "reconcile: skipping malformed item");
            }
        }
    }
    if skipped > 0 {
        counter!("reconcile_skipped_total", skipped as u64);
    }
    debug!(
        prev = prev.map(|p| p.len()).unwrap_or(0),
        next = next.len(),
        "reconcile: snapshot replaced"
    );
    next
}

/// Typed variant over the registered descriptor for `T::KIND`.
pub fn reconcile<T: KubeResource>(prev: Option<&[T]>, raw_list: Vec<RawObject>) -> Vec<T> {
    reconcile_with(prev, raw_list, T::wrap)
}
