//! Composition of the playback source descriptor

use crate::types::{PlaybackSourceDescriptor, ResolveContext, Resource};

/// Turns the selected resource into a player source
pub struct SourceComposer;

impl SourceComposer {
    /// Pure mapping, no I/O
    pub fn compose(context: &ResolveContext, resource: &Resource) -> PlaybackSourceDescriptor {
        PlaybackSourceDescriptor {
            src: resource.url.clone(),
            mime_type: resource.mime_type.clone(),
            key_systems: resource.key_systems.clone(),
            disable_trackers: context.disable_trackers.clone(),
            media_data: context.media_data.clone(),
        }
    }
}
