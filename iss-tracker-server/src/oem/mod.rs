//! Loading the ISS ephemeris from a CCSDS OEM text file
//!
//! - `parser`: KVN text to a validated `Ephemeris`
//! - `source`: HTTP and local-file `EphemerisSource` implementations

mod parser;
mod source;

pub use parser::parse_oem;
pub use source::{FileOemSource, HttpOemSource, source_from_config};

#[cfg(test)]
pub(crate) use parser::tests::SAMPLE_OEM;
