//! Ground-track projection of a state vector
//!
//! This is a spherical-Earth sub-point approximation, not an ECI to ECEF
//! transform. Latitude comes straight from the inertial position; longitude
//! is the inertial right ascension shifted by the UTC time of day and by an
//! empirical calibration offset. It is good enough to place the station over
//! the right region of a map. A proper model would rotate by Greenwich
//! sidereal time and use a WGS-84 ellipsoid.

use chrono::Timelike;

use crate::types::{GeodeticFix, StateVector};

/// Mean Earth radius used for the altitude, km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth rotation per hour of UTC time of day, degrees
pub const DEGREES_PER_HOUR: f64 = 360.0 / 24.0;

/// Empirical longitude offset, degrees.
///
/// Uncalibrated. It makes the approximation line up with published ground
/// tracks and must stay at 32 for output compatibility.
pub const LONGITUDE_CALIBRATION_DEG: f64 = 32.0;

/// Project a state vector onto the ground.
///
/// A position at the origin or on the z axis never fails: `f64::atan2(0, 0)`
/// is 0, so such positions get longitude from the time correction alone and
/// latitude 0 (origin) or ±90 (pole).
pub fn project(sv: &StateVector) -> GeodeticFix {
    let p = sv.position();
    let instant = sv.instant();

    let latitude = p.z.atan2(p.x.hypot(p.y)).to_degrees();

    let hours = f64::from(instant.hour());
    let minutes = f64::from(instant.minute());
    let rotation = ((hours - 12.0) + minutes / 60.0) * DEGREES_PER_HOUR;
    let longitude = normalize_longitude(p.y.atan2(p.x).to_degrees() - rotation + LONGITUDE_CALIBRATION_DEG);

    let altitude = p.norm() - EARTH_RADIUS_KM;

    GeodeticFix {
        latitude,
        longitude,
        altitude,
    }
}

/// Wrap a longitude into (-180, 180].
pub fn normalize_longitude(longitude: f64) -> f64 {
    if longitude > -180.0 && longitude <= 180.0 {
        return longitude;
    }
    let wrapped = 180.0 - (180.0 - longitude).rem_euclid(360.0);
    // rem_euclid may round up to exactly 360
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}
