//! Poster image scaling

use crate::{config::ResolverConfig, Result};
use url::Url;

/// Produces a scaled variant of an image URL
pub trait ImageScaler: Send + Sync {
    fn scale(&self, image_url: &str) -> Result<String>;
}

/// Integration layer image service
pub struct ImageService {
    service_url: Url,
    width: u32,
    format: String,
}

impl ImageService {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        Ok(Self {
            service_url: Url::parse(&config.image_service_url)?,
            width: config.poster_width,
            format: config.poster_format.clone(),
        })
    }
}

impl ImageScaler for ImageService {
    fn scale(&self, image_url: &str) -> Result<String> {
        let mut url = self.service_url.clone();
        url.query_pairs_mut()
            .append_pair("imageUrl", image_url)
            .append_pair("format", &self.format)
            .append_pair("width", &self.width.to_string());
        Ok(url.to_string())
    }
}
