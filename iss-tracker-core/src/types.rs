//! Plain data types shared by every query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::epoch::parse_epoch;
use crate::error::{Result, TrackerError};

/// Cartesian triple, used for positions (km) and velocities (km/s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One ephemeris sample: epoch, position and velocity.
///
/// Constructed once at load time and never modified afterwards. The epoch
/// string is kept verbatim for exact-match lookups; its parsed instant is
/// cached for time arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateVector {
    epoch: String,
    #[serde(skip)]
    instant: DateTime<Utc>,
    /// Position in km, Earth-centred inertial frame
    position: Vector3,
    /// Velocity in km/s
    velocity: Vector3,
}

impl StateVector {
    /// Validate and build a state vector.
    ///
    /// Fails if the epoch is not a `YYYY-DDDThh:mm:ss.sssZ` string or if any
    /// component is NaN or infinite.
    pub fn new(epoch: impl Into<String>, position: Vector3, velocity: Vector3) -> Result<Self> {
        let epoch = epoch.into();

        let instant = parse_epoch(&epoch).map_err(|reason| TrackerError::InvalidRecord {
            epoch: epoch.clone(),
            reason,
        })?;

        if !position.is_finite() || !velocity.is_finite() {
            return Err(TrackerError::InvalidRecord {
                epoch,
                reason: "position and velocity components must be finite".to_string(),
            });
        }

        Ok(Self {
            epoch,
            instant,
            position,
            velocity,
        })
    }

    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Epoch as a UTC instant, fractional seconds dropped
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn position(&self) -> &Vector3 {
        &self.position
    }

    pub fn velocity(&self) -> &Vector3 {
        &self.velocity
    }
}

/// Approximate ground-track location beneath a state vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticFix {
    /// Degrees, [-90, 90]
    pub latitude: f64,
    /// Degrees, (-180, 180]
    pub longitude: f64,
    /// Kilometres above a spherical Earth
    pub altitude: f64,
}

/// Answer to "where is the station right now"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentState {
    /// The state vector closest to the reference instant
    pub state_vector: StateVector,
    /// `reference - epoch` in seconds, positive when the epoch is in the past
    pub delta_seconds: f64,
    /// Speed in km/s
    pub speed: f64,
    pub location: GeodeticFix,
}
