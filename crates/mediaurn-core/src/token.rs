//! Access token decoration
//!
//! Resources declaring a token requirement have their URL exchanged for a
//! signed one before selection. Exchanges for one resolution run
//! concurrently and must all succeed.

use crate::{
    config::ResolverConfig,
    types::{Resource, TokenType},
    Error, Result,
};
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Exchanges a resource URL for a tokenized one
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Return the resource with its URL rewritten
    async fn tokenize(&self, resource: Resource) -> Result<Resource>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Token,
}

#[derive(Debug, Deserialize)]
struct Token {
    authparams: String,
}

/// Akamai token service client
pub struct AkamaiTokenService {
    client: Client,
    token_server_url: Url,
}

impl AkamaiTokenService {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Self::with_client(client, &config.token_server_url)
    }

    pub fn with_client(client: Client, token_server_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            token_server_url: Url::parse(token_server_url)?,
        })
    }

    /// Token request URL for a stream
    pub fn token_url(&self, stream_url: &Url) -> Url {
        let mut url = self.token_server_url.clone();
        url.query_pairs_mut().append_pair("acl", &token_acl(stream_url));
        url
    }
}

/// ACL covering every file next to the stream manifest
pub fn token_acl(stream_url: &Url) -> String {
    let path = stream_url.path();
    match path.rfind('/') {
        Some(idx) => format!("{}*", &path[..=idx]),
        None => "/*".to_string(),
    }
}

/// Append token parameters verbatim to the stream query
pub fn append_auth_params(stream_url: &mut Url, authparams: &str) {
    let query = match stream_url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{authparams}"),
        _ => authparams.to_string(),
    };
    stream_url.set_query(Some(&query));
}

#[async_trait]
impl TokenService for AkamaiTokenService {
    #[instrument(skip_all, fields(url = %resource.url))]
    async fn tokenize(&self, mut resource: Resource) -> Result<Resource> {
        let mut stream_url = Url::parse(&resource.url).map_err(|e| Error::TokenFetch {
            url: resource.url.clone(),
            status: None,
            status_text: e.to_string(),
        })?;
        let request_url = self.token_url(&stream_url);

        let response = self
            .client
            .get(request_url.clone())
            .send()
            .await
            .map_err(|e| Error::token_transport(request_url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::TokenFetch {
                url: request_url.to_string(),
                status: Some(status.as_u16()),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::token_transport(request_url.as_str(), &e))?;

        append_auth_params(&mut stream_url, &body.token.authparams);
        resource.url = stream_url.to_string();

        debug!("Resource tokenized");
        Ok(resource)
    }
}

/// Applies the token service to resources that need it
pub struct TokenDecorator {
    service: Arc<dyn TokenService>,
}

impl TokenDecorator {
    pub fn new(service: Arc<dyn TokenService>) -> Self {
        Self { service }
    }

    /// Tokenize every Akamai resource concurrently, keeping order
    ///
    /// Resources without a token requirement pass through untouched and
    /// cause no request. The first failing exchange fails the whole call.
    #[instrument(skip_all, fields(resources = resources.len()))]
    pub async fn compose_akamai_resources(&self, resources: Vec<Resource>) -> Result<Vec<Resource>> {
        if resources.is_empty() {
            return Ok(resources);
        }

        let service = self.service.as_ref();
        let exchanges = resources.into_iter().map(|resource| async move {
            match resource.token_type {
                TokenType::Akamai => service.tokenize(resource).await,
                TokenType::None => Ok(resource),
                TokenType::Unknown => {
                    warn!(url = %resource.url, "Unknown token type, leaving resource as is");
                    Ok(resource)
                }
            }
        });

        try_join_all(exchanges).await
    }
}
