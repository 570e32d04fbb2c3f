//! Instantaneous speed

use crate::types::StateVector;

/// Magnitude of the velocity vector, km/s
pub fn speed(sv: &StateVector) -> f64 {
    sv.velocity().norm()
}
