//! Resolver configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Integration layer host serving media compositions
    pub il_host: String,
    /// Integration layer API version
    pub il_version: String,
    /// Request chapters only, without segment details
    pub only_chapters: bool,
    /// Distribution vector sent with metadata requests
    pub vector: String,
    /// Akamai token server
    pub token_server_url: String,
    /// Image scaling service
    pub image_service_url: String,
    /// Poster width in pixels
    pub poster_width: u32,
    /// Poster image format
    pub poster_format: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Report an empty candidate list through the error sink
    pub report_no_compatible_resource: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            il_host: "il.srgssr.ch".to_string(),
            il_version: "2.1".to_string(),
            only_chapters: true,
            vector: "portalplay".to_string(),
            token_server_url: "https://tp.srgssr.ch/akahd/token".to_string(),
            image_service_url: "https://il.srgssr.ch/images/".to_string(),
            poster_width: 960,
            poster_format: "jpg".to_string(),
            request_timeout_ms: 10000,
            report_no_compatible_resource: true,
        }
    }
}

impl ResolverConfig {
    /// Load a configuration file; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Base URL of the integration layer API
    pub fn il_base_url(&self) -> String {
        format!("https://{}/integrationlayer/{}/", self.il_host, self.il_version)
    }

    pub fn validate(&self) -> Result<()> {
        if self.il_host.trim().is_empty() {
            return Err(Error::InvalidConfig("il_host must not be empty".to_string()));
        }
        if self.il_host.contains("://") {
            return Err(Error::InvalidConfig(format!(
                "il_host must be a host name, got {}",
                self.il_host
            )));
        }
        for (name, value) in [
            ("token_server_url", &self.token_server_url),
            ("image_service_url", &self.image_service_url),
        ] {
            Url::parse(value)
                .map_err(|e| Error::InvalidConfig(format!("{name}: {e}")))?;
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::InvalidConfig("request_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}
