//! Dataset lifecycle: absent, loaded, cleared
//!
//! The store owns the single shared ephemeris. Readers take a cheap
//! `Arc<Ephemeris>` snapshot under the read lock and query it without
//! holding the lock; `load` and `clear` swap the snapshot under the write
//! lock. Fetching happens before the write lock is taken, so readers never
//! see a half-loaded dataset and a failed load leaves the store untouched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dataset::Ephemeris;
use crate::error::{Result, TrackerError};
use crate::types::StateVector;

/// Produces a freshly parsed ephemeris, typically by downloading it
#[async_trait]
pub trait EphemerisSource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<Ephemeris>;

    /// Human readable origin, for logs
    fn describe(&self) -> String {
        "ephemeris source".to_string()
    }
}

/// Availability of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Nothing has been loaded yet
    Absent,
    Loaded,
    /// Data was explicitly deleted
    Cleared,
}

/// Summary of the store, safe to hand to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStatus {
    pub state: LifecycleState,
    pub state_vectors: usize,
    /// Changes on every successful load
    pub snapshot_id: Option<Uuid>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct Snapshot {
    id: Uuid,
    loaded_at: DateTime<Utc>,
    ephemeris: Arc<Ephemeris>,
}

#[derive(Debug)]
struct Slot {
    state: LifecycleState,
    snapshot: Option<Snapshot>,
}

impl Slot {
    fn status(&self) -> StoreStatus {
        StoreStatus {
            state: self.state,
            state_vectors: self.snapshot.as_ref().map_or(0, |s| s.ephemeris.len()),
            snapshot_id: self.snapshot.as_ref().map(|s| s.id),
            loaded_at: self.snapshot.as_ref().map(|s| s.loaded_at),
        }
    }
}

/// Lifecycle controller around the one loaded ephemeris
#[derive(Debug)]
pub struct TrajectoryStore {
    slot: RwLock<Slot>,
}

impl Default for TrajectoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrajectoryStore {
    /// Create an empty store in the `Absent` state
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Slot {
                state: LifecycleState::Absent,
                snapshot: None,
            }),
        }
    }

    pub async fn state(&self) -> LifecycleState {
        self.slot.read().await.state
    }

    pub async fn is_loaded(&self) -> bool {
        self.state().await == LifecycleState::Loaded
    }

    pub async fn status(&self) -> StoreStatus {
        self.slot.read().await.status()
    }

    /// Consistent view of the loaded ephemeris
    pub async fn snapshot(&self) -> Result<Arc<Ephemeris>> {
        let slot = self.slot.read().await;
        match (&slot.state, &slot.snapshot) {
            (LifecycleState::Loaded, Some(snapshot)) => Ok(snapshot.ephemeris.clone()),
            _ => Err(TrackerError::DatasetUnavailable),
        }
    }

    /// State vectors in chronological order, empty unless loaded
    pub async fn records(&self) -> Vec<StateVector> {
        match self.snapshot().await {
            Ok(ephemeris) => ephemeris.state_vectors().to_vec(),
            Err(_) => Vec::new(),
        }
    }

    /// Fetch a fresh ephemeris from `source` and install it.
    ///
    /// Works from every state; cleared data is never restored. On failure
    /// the previous state and data are kept and `LoadFailed` is returned.
    pub async fn load(&self, source: &dyn EphemerisSource) -> Result<StoreStatus> {
        info!("Loading trajectory data from {}", source.describe());

        let ephemeris = match source.fetch().await {
            Ok(ephemeris) => ephemeris,
            Err(e) => {
                warn!("Failed to load trajectory data: {:#}", e);
                return Err(TrackerError::LoadFailed(format!("{:#}", e)));
            }
        };

        Ok(self.install(ephemeris).await)
    }

    /// Replace the current contents with an already parsed ephemeris
    pub async fn install(&self, ephemeris: Ephemeris) -> StoreStatus {
        let snapshot = Snapshot {
            id: Uuid::now_v7(),
            loaded_at: Utc::now(),
            ephemeris: Arc::new(ephemeris),
        };

        let mut slot = self.slot.write().await;
        let previous = slot.state;
        slot.snapshot = Some(snapshot);
        slot.state = LifecycleState::Loaded;

        let status = slot.status();
        info!(
            "Trajectory data loaded: {} state vectors (was {:?})",
            status.state_vectors, previous
        );
        status
    }

    /// Drop the loaded data. Idempotent; returns whether anything was cleared.
    pub async fn clear(&self) -> bool {
        let mut slot = self.slot.write().await;
        match slot.state {
            LifecycleState::Loaded => {
                slot.snapshot = None;
                slot.state = LifecycleState::Cleared;
                info!("Trajectory data cleared");
                true
            }
            state => {
                debug!("Clear requested while {:?}, nothing to do", state);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dataset::tests::sample_ephemeris;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a new sample ephemeris on every fetch, or fails on demand
    pub(crate) struct CountingSource {
        pub fetches: AtomicUsize,
        pub fail: bool,
    }

    impl CountingSource {
        pub(crate) fn new() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fail: false,
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl EphemerisSource for CountingSource {
        async fn fetch(&self) -> anyhow::Result<Ephemeris> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("HTTP error 503 Service Unavailable");
            }
            Ok(sample_ephemeris(3 + n))
        }
    }

    #[tokio::test]
    async fn test_initial_state_is_absent() {
        let store = TrajectoryStore::new();
        assert_eq!(store.state().await, LifecycleState::Absent);
        assert!(!store.is_loaded().await);
        assert!(store.records().await.is_empty());
        assert_eq!(store.snapshot().await.unwrap_err(), TrackerError::DatasetUnavailable);
    }

    #[tokio::test]
    async fn test_load_clear_reload_cycle() {
        let store = TrajectoryStore::new();
        let source = CountingSource::new();

        let first = store.load(&source).await.unwrap();
        assert_eq!(first.state, LifecycleState::Loaded);
        assert_eq!(first.state_vectors, 3);
        assert_eq!(store.records().await.len(), 3);

        assert!(store.clear().await);
        assert_eq!(store.state().await, LifecycleState::Cleared);
        assert!(store.records().await.is_empty());
        assert_eq!(store.snapshot().await.unwrap_err(), TrackerError::DatasetUnavailable);

        // Second clear is a no-op
        assert!(!store.clear().await);
        assert_eq!(store.state().await, LifecycleState::Cleared);

        // Reload fetches again, cleared data is not recovered
        let second = store.load(&source).await.unwrap();
        assert_eq!(second.state_vectors, 4);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        assert_ne!(first.snapshot_id, second.snapshot_id);

        // Reload while loaded replaces the contents
        let third = store.load(&source).await.unwrap();
        assert_eq!(third.state_vectors, 5);
        assert_eq!(store.records().await.len(), 5);
    }

    #[tokio::test]
    async fn test_clear_when_absent_is_noop() {
        let store = TrajectoryStore::new();
        assert!(!store.clear().await);
        assert_eq!(store.state().await, LifecycleState::Absent);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_state() {
        let store = TrajectoryStore::new();
        let good = CountingSource::new();
        let bad = CountingSource::failing();

        let err = store.load(&bad).await.unwrap_err();
        assert!(matches!(err, TrackerError::LoadFailed(ref msg) if msg.contains("503")));
        assert_eq!(store.state().await, LifecycleState::Absent);

        let loaded = store.load(&good).await.unwrap();
        assert!(store.load(&bad).await.is_err());
        assert_eq!(store.status().await, loaded);

        store.clear().await;
        assert!(store.load(&bad).await.is_err());
        assert_eq!(store.state().await, LifecycleState::Cleared);
    }

    #[tokio::test]
    async fn test_snapshot_survives_clear() {
        let store = TrajectoryStore::new();
        store.install(sample_ephemeris(4)).await;

        let snapshot = store.snapshot().await.unwrap();
        store.clear().await;

        // A reader holding a snapshot keeps a consistent view
        assert_eq!(snapshot.len(), 4);
        assert!(store.snapshot().await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_whole_datasets() {
        let store = Arc::new(TrajectoryStore::new());
        let source = Arc::new(CountingSource::new());
        store.load(source.as_ref()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let source = source.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    if i % 4 == 0 {
                        store.clear().await;
                        store.load(source.as_ref()).await.unwrap();
                    } else if let Ok(eph) = store.snapshot().await {
                        let status_len = eph.len();
                        assert_eq!(eph.state_vectors().len(), status_len);
                        assert!(status_len >= 3);
                    }
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert!(store.is_loaded().await);
    }
}
