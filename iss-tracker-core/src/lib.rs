//! Trajectory query engine for a satellite ephemeris.
//!
//! Holds one loaded ephemeris (a list of time-tagged state vectors) and
//! answers epoch listing, exact lookup, speed, ground-track and
//! "nearest to now" queries against it.

pub mod clock;
pub mod dataset;
pub mod epoch;
pub mod error;
pub mod geodetic;
pub mod kinematics;
pub mod resolver;
pub mod store;
pub mod tracker;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dataset::{Block, Ephemeris, Page};
pub use error::{Result, TrackerError};
pub use geodetic::{EARTH_RADIUS_KM, LONGITUDE_CALIBRATION_DEG};
pub use store::{EphemerisSource, LifecycleState, StoreStatus, TrajectoryStore};
pub use tracker::Tracker;
pub use types::{CurrentState, GeodeticFix, StateVector, Vector3};
