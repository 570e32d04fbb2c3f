//! CCSDS Orbit Ephemeris Message (KVN text) parser
//!
//! Reads the plain-text OEM published for the ISS into an [`Ephemeris`]:
//! `KEY = VALUE` lines before the first `META_START` form the header,
//! lines between `META_START` and `META_STOP` form the metadata, `COMMENT`
//! lines are collected in order, and epoch-led data lines become state
//! vectors. Covariance blocks are skipped.
//!
//! NASA publishes the same ephemeris as `ISS.OEM_J2K_EPH.txt` (KVN) and
//! `ISS.OEM_J2K_EPH.xml`. Both carry the same header, metadata, comments and
//! state vectors; only the KVN edition is read here.

use anyhow::{Context, Result, anyhow};
use iss_tracker_core::{Block, Ephemeris, StateVector, Vector3};
use regex::Regex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Metadata,
    Data,
    Covariance,
}

/// Parse OEM text into a validated [`Ephemeris`].
pub fn parse_oem(text: &str) -> Result<Ephemeris> {
    let key_value = Regex::new(r"^([A-Z][A-Z0-9_]*)\s*=\s*(.*?)\s*$").context("key/value regex")?;
    let comment = Regex::new(r"^COMMENT(?:\s+(.*?))?\s*$").context("comment regex")?;
    let data_line = Regex::new(r"^\d{4}-\d{3}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z?\s").context("data regex")?;

    let mut header = Block::new();
    let mut metadata = Block::new();
    let mut comments = Vec::new();
    let mut state_vectors = Vec::new();
    let mut section = Section::Header;

    for (index, raw) in text.lines().enumerate() {
        let lno = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "META_START" => {
                section = Section::Metadata;
                continue;
            }
            "META_STOP" => {
                section = Section::Data;
                continue;
            }
            "COVARIANCE_START" => {
                section = Section::Covariance;
                continue;
            }
            "COVARIANCE_STOP" => {
                section = Section::Data;
                continue;
            }
            _ => {}
        }

        if section == Section::Covariance {
            continue;
        }

        if let Some(caps) = comment.captures(line) {
            let text = caps.get(1).map_or("", |m| m.as_str());
            comments.push(text.to_string());
            continue;
        }

        match section {
            Section::Header | Section::Metadata => {
                let Some(caps) = key_value.captures(line) else {
                    debug!("[line {}] Ignoring unrecognised line: {}", lno, line);
                    continue;
                };
                let block = if section == Section::Header { &mut header } else { &mut metadata };
                block.insert(caps[1].to_string(), caps[2].to_string());
            }
            Section::Data => {
                if !data_line.is_match(line) {
                    debug!("[line {}] Ignoring non-data line: {}", lno, line);
                    continue;
                }
                let sv = parse_state_vector(line).with_context(|| format!("line {}", lno))?;
                state_vectors.push(sv);
            }
            Section::Covariance => {}
        }
    }

    debug!(
        "Parsed OEM: {} header keys, {} metadata keys, {} comments, {} state vectors",
        header.len(),
        metadata.len(),
        comments.len(),
        state_vectors.len()
    );

    Ephemeris::new(header, metadata, comments, state_vectors).context("Invalid OEM content")
}

/// `EPOCH X Y Z X_DOT Y_DOT Z_DOT [X_DDOT Y_DDOT Z_DDOT]`
fn parse_state_vector(line: &str) -> Result<StateVector> {
    let mut parts = line.split_whitespace();
    let epoch = parts.next().ok_or_else(|| anyhow!("empty data line"))?;

    let values: Vec<f64> = parts
        .take(6)
        .map(|p| p.parse::<f64>().with_context(|| format!("invalid number '{}'", p)))
        .collect::<Result<_>>()?;
    if values.len() != 6 {
        return Err(anyhow!(
            "expected 6 state components after epoch {}, found {}",
            epoch,
            values.len()
        ));
    }

    let sv = StateVector::new(
        epoch,
        Vector3::new(values[0], values[1], values[2]),
        Vector3::new(values[3], values[4], values[5]),
    )?;
    Ok(sv)
}
