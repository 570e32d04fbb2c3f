use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "ISS_TRACKER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Forces debug logging
    #[serde(default)]
    pub debug: bool,

    /// OEM text file: http(s) URL, `file://` URL or local path
    #[serde(default = "default_oem_url")]
    pub oem_url: String,

    #[serde(default = "default_fetch_timeout_seconds")]
    pub fetch_timeout_seconds: u64,

    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,

    #[serde(default = "default_geocoder_enabled")]
    pub geocoder_enabled: bool,

    /// Nominatim-compatible reverse geocoding endpoint
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_oem_url() -> String {
    "https://nasa-public-data.s3.amazonaws.com/iss-coords/current/ISS_OEM/ISS.OEM_J2K_EPH.txt".to_string()
}

fn default_fetch_timeout_seconds() -> u64 {
    60
}

fn default_fetch_retries() -> u32 {
    3
}

fn default_geocoder_enabled() -> bool {
    true
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

fn default_user_agent() -> String {
    format!("iss-tracker/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            debug: false,
            oem_url: default_oem_url(),
            fetch_timeout_seconds: default_fetch_timeout_seconds(),
            fetch_retries: default_fetch_retries(),
            geocoder_enabled: default_geocoder_enabled(),
            geocoder_url: default_geocoder_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: ServerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Config path from the first CLI argument, then the environment
    pub fn resolve_path(cli_arg: Option<String>) -> String {
        cli_arg
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Log level after applying the debug flag
    pub fn effective_log_level(&self) -> &str {
        if self.debug { "debug" } else { &self.log_level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\ndebug = true").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.debug);
        assert_eq!(config.effective_log_level(), "debug");
        assert_eq!(config.fetch_retries, 3);
        assert_eq!(config.server_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.effective_log_level(), "info");
        assert!(config.oem_url.ends_with(".txt"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        assert!(ServerConfig::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_resolve_path_prefers_cli() {
        assert_eq!(ServerConfig::resolve_path(Some("custom.toml".to_string())), "custom.toml");
    }
}
