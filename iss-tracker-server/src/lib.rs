//! HTTP front end of the ISS tracker

pub mod config;
pub mod error;
pub mod geocoder;
pub mod logging;
pub mod oem;
pub mod routes;
