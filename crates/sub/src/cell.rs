//! Latest-snapshot cells: what consumers poll between deliveries.
//!
//! `None` means no delivery has arrived yet (loading); an empty vector is a
//! real, empty snapshot. On a transport error a cell keeps the last good
//! value, so displays degrade to stale instead of blank.

#![forbid(unsafe_code)]

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::warn;

use vantage_core::VantageError;

use crate::manager::{GetUpdate, ListUpdate};

/// Holds the latest list snapshot, shared between the subscription handler
/// and whoever renders it.
pub struct SnapshotCell<T> {
    latest: Arc<ArcSwapOption<Vec<T>>>,
    last_error: Arc<ArcSwapOption<VantageError>>,
}

impl<T> SnapshotCell<T> {
    pub fn new() -> Self {
        Self {
            latest: Arc::new(ArcSwapOption::empty()),
            last_error: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// Latest snapshot; `None` until the first delivery.
    pub fn current(&self) -> Option<Arc<Vec<T>>> {
        self.latest.load_full()
    }

    /// Error from the most recent delivery, cleared by the next good one.
    pub fn last_error(&self) -> Option<Arc<VantageError>> {
        self.last_error.load_full()
    }

    pub fn store(&self, snap: Arc<Vec<T>>) {
        self.latest.store(Some(snap));
        self.last_error.store(None);
    }

    /// Handler wiring this cell to a list subscription.
    pub fn subscriber(&self) -> impl FnMut(ListUpdate<T>) + Send + 'static
    where
        T: Send + Sync + 'static,
    {
        let latest = self.latest.clone();
        let last_error = self.last_error.clone();
        move |update| match update {
            ListUpdate::Snapshot(snap) => {
                latest.store(Some(snap));
                last_error.store(None);
            }
            ListUpdate::Error(e) => {
                warn!(error = %e, "cell: transport error; keeping last snapshot");
                last_error.store(Some(Arc::new(e)));
            }
        }
    }
}

impl<T> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SnapshotCell<T> {
    fn clone(&self) -> Self {
        Self {
            latest: self.latest.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Single-object counterpart of `SnapshotCell`.
pub struct ObjectCell<T> {
    latest: Arc<ArcSwapOption<T>>,
    last_error: Arc<ArcSwapOption<VantageError>>,
}

impl<T> ObjectCell<T> {
    pub fn new() -> Self {
        Self {
            latest: Arc::new(ArcSwapOption::empty()),
            last_error: Arc::new(ArcSwapOption::empty()),
        }
    }

    pub fn current(&self) -> Option<Arc<T>> {
        self.latest.load_full()
    }

    pub fn last_error(&self) -> Option<Arc<VantageError>> {
        self.last_error.load_full()
    }

    pub fn subscriber(&self) -> impl FnMut(GetUpdate<T>) + Send + 'static
    where
        T: Send + Sync + 'static,
    {
        let latest = self.latest.clone();
        let last_error = self.last_error.clone();
        move |update| match update {
            GetUpdate::Object(obj) => {
                latest.store(Some(Arc::new(obj)));
                last_error.store(None);
            }
            GetUpdate::Error(e) => {
                warn!(error = %e, "cell: transport error; keeping last object");
                last_error.store(Some(Arc::new(e)));
            }
        }
    }
}

impl<T> Default for ObjectCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ObjectCell<T> {
    fn clone(&self) -> Self {
        Self {
            latest: self.latest.clone(),
            last_error: self.last_error.clone(),
        }
    }
}
