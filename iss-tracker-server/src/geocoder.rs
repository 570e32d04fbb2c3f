//! Reverse geocoding of ground-track fixes
//!
//! Never fails: any transport error, timeout or "unable to geocode" answer
//! (the station spends most of its time over water) becomes
//! [`Geoposition::Unknown`].

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const GEOCODER_TIMEOUT_SECONDS: u64 = 10;
/// Country-level detail is all a ground track can support
const GEOCODER_ZOOM: u8 = 5;

/// Human readable place under a fix
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Geoposition {
    Known {
        display_name: String,
        address: BTreeMap<String, String>,
    },
    Unknown(&'static str),
}

impl Geoposition {
    pub fn unknown() -> Self {
        Geoposition::Unknown("unknown")
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

pub struct Geocoder {
    client: reqwest::Client,
    url: String,
    enabled: bool,
}

impl Geocoder {
    pub fn new(url: impl Into<String>, user_agent: &str, enabled: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GEOCODER_TIMEOUT_SECONDS))
            .user_agent(user_agent)
            .build()
            .context("Failed to build geocoder HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            enabled,
        })
    }

    /// Geocoder that always answers "unknown"
    pub fn disabled() -> Result<Self> {
        Self::new(String::new(), "iss-tracker", false)
    }

    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Geoposition {
        if !self.enabled {
            return Geoposition::unknown();
        }

        match self.lookup(latitude, longitude).await {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!("Reverse geocoding ({:.4}, {:.4}) failed: {:#}", latitude, longitude, e);
                Geoposition::unknown()
            }
        }
    }

    async fn lookup(&self, latitude: f64, longitude: f64) -> Result<Geoposition> {
        let url = format!(
            "{}?format=json&lat={}&lon={}&zoom={}",
            self.url, latitude, longitude, GEOCODER_ZOOM
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send reverse geocoding request")?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("HTTP error {}", response.status()));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .context("Failed to parse reverse geocoding response")?;

        Ok(interpret(body))
    }
}

fn interpret(body: ReverseResponse) -> Geoposition {
    if let Some(error) = body.error {
        tracing::debug!("Geocoder has no place here: {}", error);
        return Geoposition::unknown();
    }

    match body.display_name {
        Some(display_name) => Geoposition::Known {
            display_name,
            address: body
                .address
                .into_iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                .collect(),
        },
        None => Geoposition::unknown(),
    }
}
