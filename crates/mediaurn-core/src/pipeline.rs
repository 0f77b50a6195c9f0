//! Resolution Pipeline - main orchestrator for URN resolution
//!
//! Coordinates:
//! - Media composition fetching
//! - Resource filtering, key-system mapping and tokenization
//! - Resource selection and source composition
//! - State machine transitions
//! - Error sink, poster, title bar and tracker side effects

use crate::{
    composition::MediaComposition,
    drm::KeySystemMapper,
    filter::ResourceFilter,
    host::{PlayerHost, NETWORK_MESSAGE_KEY, NO_COMPATIBLE_RESOURCE_MESSAGE_KEY},
    image::{ImageScaler, ImageService},
    provider::{DataProvider, MetadataClient},
    selector::ResourceSelector,
    source::SourceComposer,
    token::{AkamaiTokenService, TokenDecorator, TokenService},
    types::*,
    config::ResolverConfig,
    Error, Result,
};
use std::sync::Arc;
use tracing::{debug, field, info, instrument, warn, Span};

/// Outcome of one resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionOutcome {
    pub id: ResolutionId,
    /// Terminal state reached
    pub state: ResolutionState,
    /// Present only when `state` is `Resolved`
    pub source: Option<PlaybackSourceDescriptor>,
}

/// Selected resource together with what it was selected from
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub composition: MediaComposition,
    pub resource: Resource,
    pub descriptor: PlaybackSourceDescriptor,
}

/// Resources of a composition annotated with the selection result,
/// computed without token exchange or side effects
#[derive(Debug, Clone)]
pub struct Inspection {
    pub composition: MediaComposition,
    /// Main chapter resources as fetched
    pub resources: Vec<Resource>,
    /// Resources surviving the filter, with key systems mapped
    pub candidates: Vec<Resource>,
    pub selected: Option<Resource>,
}

/// State of a single in-flight resolution
struct Run {
    id: ResolutionId,
    state: ResolutionState,
}

impl Run {
    fn new() -> Self {
        Self {
            id: ResolutionId::new(),
            state: ResolutionState::Idle,
        }
    }

    fn advance(&mut self, next: ResolutionState) {
        if !self.state.can_transition_to(next) {
            warn!(from = %self.state, to = %next, "Unexpected state transition");
        }
        info!(resolution_id = %self.id, from = %self.state, to = %next, "State transition");
        self.state = next;
    }

    fn finish(self, source: Option<PlaybackSourceDescriptor>) -> ResolutionOutcome {
        ResolutionOutcome {
            id: self.id,
            state: self.state,
            source,
        }
    }
}

/// Resolves media URNs into playback sources
///
/// The pipeline holds no per-resolution state, so one instance can serve
/// any number of concurrent resolutions.
pub struct ResolutionPipeline {
    /// Resolver configuration
    config: ResolverConfig,
    /// Media composition source
    metadata_client: Arc<dyn MetadataClient>,
    /// Token exchange for protected resources
    token_decorator: TokenDecorator,
    /// Poster scaling
    image_scaler: Arc<dyn ImageScaler>,
    /// Player sinks
    host: Arc<dyn PlayerHost>,
    /// Environment-aware resource selection
    selector: ResourceSelector,
}

impl ResolutionPipeline {
    /// Create a pipeline backed by the production collaborators
    pub fn new(config: ResolverConfig, host: Arc<dyn PlayerHost>) -> Result<Self> {
        config.validate()?;

        let metadata_client: Arc<dyn MetadataClient> = Arc::new(DataProvider::new(&config)?);
        let token_service: Arc<dyn TokenService> = Arc::new(AkamaiTokenService::new(&config)?);
        let image_scaler: Arc<dyn ImageScaler> = Arc::new(ImageService::new(&config)?);

        Ok(Self {
            config,
            metadata_client,
            token_decorator: TokenDecorator::new(token_service),
            image_scaler,
            host,
            selector: ResourceSelector::default(),
        })
    }

    pub fn with_metadata_client(mut self, metadata_client: Arc<dyn MetadataClient>) -> Self {
        self.metadata_client = metadata_client;
        self
    }

    pub fn with_token_service(mut self, token_service: Arc<dyn TokenService>) -> Self {
        self.token_decorator = TokenDecorator::new(token_service);
        self
    }

    pub fn with_image_scaler(mut self, image_scaler: Arc<dyn ImageScaler>) -> Self {
        self.image_scaler = image_scaler;
        self
    }

    pub fn with_environment(mut self, environment: PlaybackEnvironment) -> Self {
        self.selector = ResourceSelector::new(environment);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn environment(&self) -> PlaybackEnvironment {
        self.selector.environment()
    }

    /// Resolve a URN into a playback source
    ///
    /// Fails only when no URN is supplied. Every other failure is reported
    /// through the host's error sink and resolves to `None`.
    pub async fn resolve(
        &self,
        urn: Option<&str>,
        context: &ResolveContext,
    ) -> Result<Option<PlaybackSourceDescriptor>> {
        Ok(self.resolve_detailed(urn, context).await?.source)
    }

    /// Like [`resolve`](Self::resolve), also reporting the terminal state
    #[instrument(skip(self, context), fields(resolution_id = field::Empty))]
    pub async fn resolve_detailed(
        &self,
        urn: Option<&str>,
        context: &ResolveContext,
    ) -> Result<ResolutionOutcome> {
        let urn = require_urn(urn)?;

        let mut run = Run::new();
        Span::current().record("resolution_id", field::display(run.id));

        let resolved = match self.fetch_and_compose(urn, context, &mut run).await {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(error = %err, code = err.error_code(), "Resolution failed");
                run.advance(ResolutionState::ResolutionError);
                self.report_failure(&err);
                return Ok(run.finish(None));
            }
        };

        if let Some(reason) = resolved.resource.block_reason {
            info!(reason = %reason, "Content is blocked");
            run.advance(ResolutionState::BlockedError);
            self.report_blocked(reason, &resolved.descriptor);
            return Ok(run.finish(None));
        }

        run.advance(ResolutionState::Resolved);
        self.update_poster(&resolved.composition);
        self.update_title_bar(&resolved.composition);
        self.init_tracker(&resolved.resource, context);

        info!(src = %resolved.descriptor.src, mime_type = %resolved.descriptor.mime_type, "Source resolved");

        Ok(run.finish(Some(resolved.descriptor)))
    }

    /// Fetch, filter, tokenize, select and compose without touching the host
    ///
    /// Returns `Error::Blocked` for a blocked selection.
    #[instrument(skip(self, context))]
    pub async fn compose_source(&self, urn: Option<&str>, context: &ResolveContext) -> Result<ResolvedSource> {
        let urn = require_urn(urn)?;
        let resolved = self.fetch_and_compose(urn, context, &mut Run::new()).await?;

        match resolved.resource.block_reason {
            Some(reason) => Err(Error::Blocked { reason }),
            None => Ok(resolved),
        }
    }

    /// Show how the resources of a URN would be filtered and ranked
    #[instrument(skip(self))]
    pub async fn inspect(&self, urn: &str) -> Result<Inspection> {
        let urn = require_urn(Some(urn))?;
        let composition = self.metadata_client.fetch_by_urn(urn).await?;
        let resources = composition.main_resources();
        let candidates = KeySystemMapper::map_key_systems(ResourceFilter::filter(resources.clone()));
        let selected = self.selector.select(&candidates).cloned();

        Ok(Inspection {
            composition,
            resources,
            candidates,
            selected,
        })
    }

    async fn fetch_and_compose(
        &self,
        urn: &str,
        context: &ResolveContext,
        run: &mut Run,
    ) -> Result<ResolvedSource> {
        run.advance(ResolutionState::Fetching);
        let composition = self.metadata_client.fetch_by_urn(urn).await?;

        run.advance(ResolutionState::Filtering);
        let candidates = self.prepare_candidates(&composition).await?;
        debug!(candidates = candidates.len(), "Candidates prepared");

        run.advance(ResolutionState::Selecting);
        let resource = self
            .selector
            .select(&candidates)
            .cloned()
            .ok_or(Error::NoCompatibleResource)?;
        let descriptor = SourceComposer::compose(context, &resource);

        Ok(ResolvedSource {
            composition,
            resource,
            descriptor,
        })
    }

    async fn prepare_candidates(&self, composition: &MediaComposition) -> Result<Vec<Resource>> {
        let resources = ResourceFilter::filter(composition.main_resources());
        let resources = KeySystemMapper::map_key_systems(resources);
        self.token_decorator.compose_akamai_resources(resources).await
    }

    fn report(&self, error: ErrorDescriptor) {
        self.host.clear_error();
        self.host.report_error(error);
    }

    fn report_blocked(&self, reason: BlockReason, source: &PlaybackSourceDescriptor) {
        self.report(ErrorDescriptor {
            code: ErrorDescriptor::MEDIA_ERR_ABORTED,
            message: self.host.localize(reason.as_str()),
            metadata: ErrorMetadata {
                error_type: reason.as_str().to_string(),
                src: Some(source.clone()),
                ..Default::default()
            },
        });
    }

    fn report_failure(&self, err: &Error) {
        if let Some(failure) = err.request_failure() {
            let base_url = self.metadata_client.base_url();
            let url = if base_url.is_empty() {
                failure.url
            } else {
                failure.url.replace(base_url, "")
            };

            self.report(ErrorDescriptor {
                code: ErrorDescriptor::MEDIA_ERR_NETWORK,
                message: self.host.localize(NETWORK_MESSAGE_KEY),
                metadata: ErrorMetadata {
                    error_type: NETWORK_MESSAGE_KEY.to_string(),
                    url: Some(url),
                    status: failure.status,
                    status_text: Some(failure.status_text),
                    ..Default::default()
                },
            });
            return;
        }

        match err {
            Error::NoCompatibleResource if !self.config.report_no_compatible_resource => {
                info!("No compatible resource, not reported");
            }
            Error::NoCompatibleResource => {
                self.report(ErrorDescriptor {
                    code: ErrorDescriptor::MEDIA_ERR_SRC_NOT_SUPPORTED,
                    message: self.host.localize(NO_COMPATIBLE_RESOURCE_MESSAGE_KEY),
                    metadata: ErrorMetadata {
                        error_type: err.error_code().to_string(),
                        ..Default::default()
                    },
                });
            }
            other => {
                self.report(ErrorDescriptor {
                    code: ErrorDescriptor::MEDIA_ERR_ABORTED,
                    message: self.host.localize(other.error_code()),
                    metadata: ErrorMetadata {
                        error_type: other.error_code().to_string(),
                        ..Default::default()
                    },
                });
            }
        }
    }

    fn update_poster(&self, composition: &MediaComposition) {
        let Some(image_url) = composition.main_chapter_image_url() else {
            debug!("No chapter image, poster left unchanged");
            return;
        };

        let result = self
            .image_scaler
            .scale(image_url)
            .map_err(anyhow::Error::from)
            .and_then(|scaled| self.host.update_poster(&scaled));

        if let Err(e) = result {
            warn!(error = %e, "Poster update failed");
        }
    }

    fn update_title_bar(&self, composition: &MediaComposition) {
        let Some(chapter) = composition.main_chapter() else {
            return;
        };

        let title_bar = TitleBar {
            title: chapter.vendor.clone(),
            description: chapter.title.clone(),
        };

        if let Err(e) = self.host.update_title_bar(&title_bar) {
            warn!(error = %e, "Title bar update failed");
        }
    }

    fn init_tracker(&self, resource: &Resource, context: &ResolveContext) {
        if matches!(context.disable_trackers, Some(DisableTrackers::All(true))) {
            debug!("Trackers disabled for this source");
            return;
        }

        if let Err(e) = self.host.init_tracker(resource) {
            warn!(error = %e, "Tracker initialization failed");
        }
    }
}

/// A missing or blank URN ends the resolution before any work is done
fn require_urn(urn: Option<&str>) -> Result<&str> {
    match urn.map(str::trim) {
        Some(urn) if !urn.is_empty() => Ok(urn),
        _ => {
            warn!("Resolution requested without a URN");
            Err(Error::MissingUrn)
        }
    }
}
