//! Query facade over the shared trajectory store

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::clock::Clock;
use crate::dataset::{Block, Ephemeris, Page};
use crate::error::Result;
use crate::geodetic::project;
use crate::kinematics::speed;
use crate::resolver::current_state;
use crate::store::{EphemerisSource, StoreStatus, TrajectoryStore};
use crate::types::{CurrentState, GeodeticFix, StateVector};

/// Entry point used by the request layer.
///
/// Holds the store, the source used for (re)loads and the clock used for
/// "now" queries. Cloning is cheap and every clone shares the same store.
#[derive(Clone)]
pub struct Tracker {
    store: Arc<TrajectoryStore>,
    source: Arc<dyn EphemerisSource>,
    clock: Arc<dyn Clock>,
}

impl Tracker {
    pub fn new(source: Arc<dyn EphemerisSource>, clock: Arc<dyn Clock>) -> Self {
        Self::with_store(Arc::new(TrajectoryStore::new()), source, clock)
    }

    pub fn with_store(
        store: Arc<TrajectoryStore>,
        source: Arc<dyn EphemerisSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            source,
            clock,
        }
    }

    pub fn store(&self) -> &Arc<TrajectoryStore> {
        &self.store
    }

    /// Fetch fresh data from the source and replace whatever is loaded
    pub async fn load(&self) -> Result<StoreStatus> {
        self.store.load(self.source.as_ref()).await
    }

    /// Delete the loaded data; returns false if there was nothing to delete
    pub async fn clear(&self) -> bool {
        self.store.clear().await
    }

    pub async fn status(&self) -> StoreStatus {
        self.store.status().await
    }

    pub async fn is_loaded(&self) -> bool {
        self.store.is_loaded().await
    }

    pub async fn records(&self) -> Vec<StateVector> {
        self.store.records().await
    }

    /// The whole loaded ephemeris
    pub async fn ephemeris(&self) -> Result<Arc<Ephemeris>> {
        self.store.snapshot().await
    }

    pub async fn header(&self) -> Result<Block> {
        Ok(self.store.snapshot().await?.header().clone())
    }

    pub async fn metadata(&self) -> Result<Block> {
        Ok(self.store.snapshot().await?.metadata().clone())
    }

    pub async fn comments(&self) -> Result<Vec<String>> {
        Ok(self.store.snapshot().await?.comments().to_vec())
    }

    /// Epoch listing from raw `offset` / `limit` query values.
    ///
    /// Availability is checked before the arguments, so an unloaded store
    /// always answers `DatasetUnavailable`.
    pub async fn list_epochs(&self, offset: Option<&str>, limit: Option<&str>) -> Result<Vec<String>> {
        let ephemeris = self.store.snapshot().await?;
        let page = Page::parse(offset, limit)?;
        debug!("Listing epochs with {:?}", page);
        Ok(ephemeris.list_epochs(page))
    }

    pub async fn state_vector(&self, epoch: &str) -> Result<StateVector> {
        let ephemeris = self.store.snapshot().await?;
        ephemeris.find_by_epoch(epoch).cloned()
    }

    /// Speed at an epoch, km/s
    pub async fn speed(&self, epoch: &str) -> Result<f64> {
        let ephemeris = self.store.snapshot().await?;
        Ok(speed(ephemeris.find_by_epoch(epoch)?))
    }

    pub async fn location(&self, epoch: &str) -> Result<GeodeticFix> {
        let ephemeris = self.store.snapshot().await?;
        Ok(project(ephemeris.find_by_epoch(epoch)?))
    }

    /// State closest to the clock's current time
    pub async fn now(&self) -> Result<CurrentState> {
        self.at(self.clock.now()).await
    }

    /// State closest to an explicit reference instant
    pub async fn at(&self, reference: DateTime<Utc>) -> Result<CurrentState> {
        let ephemeris = self.store.snapshot().await?;
        current_state(&ephemeris, reference)
    }
}
