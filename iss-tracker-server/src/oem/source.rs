//! Ephemeris sources backed by the published OEM file
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use iss_tracker_core::{Ephemeris, EphemerisSource};

use super::parser::parse_oem;
use crate::config::ServerConfig;

const RETRY_DELAY_SECONDS: u64 = 2;

/// Downloads the OEM text over HTTP(S), retrying transient failures
pub struct HttpOemSource {
    client: reqwest::Client,
    url: String,
    max_retries: u32,
}

impl HttpOemSource {
    pub fn new(url: impl Into<String>, timeout: Duration, max_retries: u32, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            max_retries: max_retries.max(1),
        })
    }

    /// Single fetch attempt
    async fn fetch_attempt(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.url))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("HTTP error {} from {}", response.status(), self.url));
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", self.url))
    }
}

#[async_trait]
impl EphemerisSource for HttpOemSource {
    async fn fetch(&self) -> Result<Ephemeris> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            if attempt > 1 {
                let delay = Duration::from_secs(RETRY_DELAY_SECONDS * attempt as u64);
                tracing::debug!(
                    "Retrying {} after {:?} (attempt {}/{})",
                    self.url,
                    delay,
                    attempt,
                    self.max_retries
                );
                tokio::time::sleep(delay).await;
            }

            match self.fetch_attempt().await {
                Ok(body) => {
                    tracing::debug!("Fetched {} bytes from {}", body.len(), self.url);
                    // A body that downloads but does not parse will not improve on retry
                    return parse_oem(&body).with_context(|| format!("Failed to parse OEM from {}", self.url));
                }
                Err(e) => {
                    tracing::warn!("Attempt {}/{} failed for {}: {:#}", attempt, self.max_retries, self.url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("no fetch attempt was made"))
            .context(format!("Giving up on {} after {} attempts", self.url, self.max_retries)))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the OEM text from a local file, re-reading it on every load
pub struct FileOemSource {
    path: PathBuf,
}

impl FileOemSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EphemerisSource for FileOemSource {
    async fn fetch(&self) -> Result<Ephemeris> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read OEM file {:?}", self.path))?;
        parse_oem(&text).with_context(|| format!("Failed to parse OEM file {:?}", self.path))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pick the source matching the configured `oem_url`
pub fn source_from_config(config: &ServerConfig) -> Result<Arc<dyn EphemerisSource>> {
    let url = config.oem_url.trim();

    if url.starts_with("http://") || url.starts_with("https://") {
        let source = HttpOemSource::new(
            url,
            Duration::from_secs(config.fetch_timeout_seconds),
            config.fetch_retries,
            &config.user_agent,
        )?;
        Ok(Arc::new(source))
    } else {
        let path = url.strip_prefix("file://").unwrap_or(url);
        Ok(Arc::new(FileOemSource::new(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oem::parser::tests::SAMPLE_OEM;

    #[tokio::test]
    async fn test_file_source_reads_fresh_on_each_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ISS.OEM_J2K_EPH.txt");
        std::fs::write(&path, SAMPLE_OEM).unwrap();

        let source = FileOemSource::new(&path);
        assert_eq!(source.fetch().await.unwrap().len(), 3);

        std::fs::write(&path, "not an ephemeris").unwrap();
        assert!(source.fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileOemSource::new("/nonexistent/ISS.OEM_J2K_EPH.txt");
        let err = source.fetch().await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read OEM file"));
    }

    #[test]
    fn test_source_from_config() {
        let mut config = ServerConfig::default();
        assert!(source_from_config(&config).unwrap().describe().starts_with("https://"));

        config.oem_url = "file:///data/ISS.OEM_J2K_EPH.txt".to_string();
        assert_eq!(source_from_config(&config).unwrap().describe(), "/data/ISS.OEM_J2K_EPH.txt");

        config.oem_url = "data/ISS.OEM_J2K_EPH.txt".to_string();
        assert_eq!(source_from_config(&config).unwrap().describe(), "data/ISS.OEM_J2K_EPH.txt");
    }

    #[tokio::test]
    #[ignore] // Requires network connection
    async fn test_fetch_live_oem() {
        let config = ServerConfig::default();
        let source = source_from_config(&config).unwrap();
        let eph = source.fetch().await.unwrap();
        assert!(eph.len() > 100);
    }
}
