//! Removal of resources the target runtime cannot play

use crate::types::Resource;
use tracing::debug;

/// Drops resources with an unsupported delivery protocol
pub struct ResourceFilter;

impl ResourceFilter {
    /// Keep HLS, DASH and progressive resources, preserving their order
    pub fn filter(resources: Vec<Resource>) -> Vec<Resource> {
        let total = resources.len();
        let kept: Vec<Resource> = resources
            .into_iter()
            .filter(|resource| resource.streaming.is_supported())
            .collect();

        if kept.len() < total {
            debug!(dropped = total - kept.len(), kept = kept.len(), "Filtered incompatible resources");
        }

        kept
    }
}
