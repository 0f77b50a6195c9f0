//! Selection of the single resource handed to the player
//!
//! Rules, first match wins:
//! 1. Runtimes that cannot play tokenized adaptive streams take the first
//!    resource with a recognized token type.
//! 2. Safari-family runtimes take the first HLS resource.
//! 3. Everything else takes the first DASH resource.
//! 4. Otherwise the first candidate.
//!
//! Within a rule the order of the candidate list decides; `is_first` is
//! never consulted.

use crate::types::{PlaybackEnvironment, Resource, StreamingProtocol};
use tracing::debug;

/// Picks the best resource for a playback environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceSelector {
    environment: PlaybackEnvironment,
}

impl ResourceSelector {
    pub fn new(environment: PlaybackEnvironment) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> PlaybackEnvironment {
        self.environment
    }

    /// Select a resource; `None` only for an empty candidate list
    pub fn select<'a>(&self, resources: &'a [Resource]) -> Option<&'a Resource> {
        if !self.environment.tokenized_adaptive_streaming {
            if let Some(resource) = resources.iter().find(|r| r.token_type.is_recognized()) {
                debug!(url = %resource.url, "Selected token-bearing resource");
                return Some(resource);
            }
        }

        let preferred = if self.environment.any_safari {
            StreamingProtocol::Hls
        } else {
            StreamingProtocol::Dash
        };

        let selected = resources
            .iter()
            .find(|r| r.streaming == preferred)
            .or_else(|| resources.first());

        if let Some(resource) = selected {
            debug!(streaming = %resource.streaming, url = %resource.url, "Selected resource");
        }

        selected
    }
}
