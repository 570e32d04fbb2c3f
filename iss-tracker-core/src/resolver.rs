//! Nearest-epoch resolution

use chrono::{DateTime, Utc};

use crate::dataset::Ephemeris;
use crate::error::{Result, TrackerError};
use crate::geodetic::project;
use crate::kinematics::speed;
use crate::types::{CurrentState, StateVector};

/// State vector whose epoch is closest to `reference`.
///
/// Records are scanned in chronological order and the candidate only changes
/// on a strictly smaller distance, so the earlier of two equidistant records
/// wins.
pub fn nearest_to(ephemeris: &Ephemeris, reference: DateTime<Utc>) -> Result<&StateVector> {
    let mut vectors = ephemeris.state_vectors().iter();
    let mut best = vectors.next().ok_or(TrackerError::DatasetUnavailable)?;
    let mut best_distance = distance_ms(best, reference);

    for sv in vectors {
        let distance = distance_ms(sv, reference);
        if distance < best_distance {
            best = sv;
            best_distance = distance;
        }
    }

    Ok(best)
}

/// Nearest state vector together with its speed, ground fix and time offset.
pub fn current_state(ephemeris: &Ephemeris, reference: DateTime<Utc>) -> Result<CurrentState> {
    let sv = nearest_to(ephemeris, reference)?;
    let delta_ms = reference.signed_duration_since(sv.instant()).num_milliseconds();

    Ok(CurrentState {
        state_vector: sv.clone(),
        delta_seconds: delta_ms as f64 / 1000.0,
        speed: speed(sv),
        location: project(sv),
    })
}

fn distance_ms(sv: &StateVector, reference: DateTime<Utc>) -> i64 {
    reference
        .signed_duration_since(sv.instant())
        .num_milliseconds()
        .abs()
}
