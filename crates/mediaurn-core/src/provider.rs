//! Metadata client fetching media compositions by URN

use crate::{composition::MediaComposition, config::ResolverConfig, Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// Source of media compositions
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Fetch the composition describing `urn`
    async fn fetch_by_urn(&self, urn: &str) -> Result<MediaComposition>;

    /// Prefix stripped from failing URLs before they are reported
    fn base_url(&self) -> &str {
        ""
    }
}

/// Integration layer metadata client
pub struct DataProvider {
    client: Client,
    base_url: String,
    only_chapters: bool,
    vector: String,
}

impl DataProvider {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &ResolverConfig) -> Self {
        Self {
            client,
            base_url: config.il_base_url(),
            only_chapters: config.only_chapters,
            vector: config.vector.clone(),
        }
    }

    /// URL of the composition for `urn`
    pub fn composition_url(&self, urn: &str) -> String {
        format!(
            "{}mediaComposition/byUrn/{}?onlyChapters={}&vector={}",
            self.base_url, urn, self.only_chapters, self.vector
        )
    }
}

#[async_trait]
impl MetadataClient for DataProvider {
    #[instrument(skip(self))]
    async fn fetch_by_urn(&self, urn: &str) -> Result<MediaComposition> {
        let url = self.composition_url(urn);
        debug!(url = %url, "Fetching media composition");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::metadata_transport(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::MetadataFetch {
                url,
                status: Some(status.as_u16()),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::metadata_transport(&url, &e))?;

        MediaComposition::from_json(&body)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composition_url() {
        let provider = DataProvider::new(&ResolverConfig::default()).unwrap();

        assert_eq!(
            provider.composition_url("urn:rts:video:10313496"),
            "https://il.srgssr.ch/integrationlayer/2.1/mediaComposition/byUrn/urn:rts:video:10313496?onlyChapters=true&vector=portalplay"
        );
        assert_eq!(provider.base_url(), "https://il.srgssr.ch/integrationlayer/2.1/");
    }

    #[test]
    fn test_composition_url_follows_config() {
        let config = ResolverConfig {
            il_host: "il-stage.srgssr.ch".to_string(),
            only_chapters: false,
            vector: "appplay".to_string(),
            ..Default::default()
        };
        let provider = DataProvider::new(&config).unwrap();

        assert_eq!(
            provider.composition_url("urn:srf:audio:1"),
            "https://il-stage.srgssr.ch/integrationlayer/2.1/mediaComposition/byUrn/urn:srf:audio:1?onlyChapters=false&vector=appplay"
        );
    }
}
