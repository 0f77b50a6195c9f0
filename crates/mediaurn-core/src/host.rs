//! Player host hooks - error sink, localization, poster, title bar and tracker

use crate::types::{ErrorDescriptor, Resource, TitleBar};

/// Message key for network failures
pub const NETWORK_MESSAGE_KEY: &str = "NETWORK";
/// Message key for an empty candidate list
pub const NO_COMPATIBLE_RESOURCE_MESSAGE_KEY: &str = "NO_COMPATIBLE_RESOURCE";

/// Built-in English message for a localization key
pub fn default_message(key: &str) -> &'static str {
    match key {
        "AGERATING12" => "To protect children, this content is only available between 8PM and 6AM.",
        "AGERATING18" => "To protect children, this content is only available between 10PM and 5AM.",
        "COMMERCIAL" => "This commercial content is not available.",
        "ENDDATE" => "This content is not available anymore.",
        "GEOBLOCK" => "This content is not available outside Switzerland.",
        "JOURNALISTIC" => "This content is temporarily unavailable for journalistic reasons.",
        "LEGAL" => "This content is not available due to legal restrictions.",
        "STARTDATE" => "This content is not available yet.",
        "VPNPROXYDETECTED" => "This content is not available through a VPN or proxy.",
        NETWORK_MESSAGE_KEY => "A network error caused the media download to fail part-way.",
        NO_COMPATIBLE_RESOURCE_MESSAGE_KEY => "No compatible source was found for this media.",
        _ => "This content is not available.",
    }
}

/// Side-effect sinks provided by the player integration
///
/// Poster, title bar and tracker updates are best effort: an error
/// returned from them is logged and otherwise ignored.
pub trait PlayerHost: Send + Sync {
    /// Translate a message key
    fn localize(&self, key: &str) -> String {
        default_message(key).to_string()
    }

    /// Reset the player's current error
    fn clear_error(&self);

    /// Surface an error to the end user
    fn report_error(&self, error: ErrorDescriptor);

    fn update_poster(&self, image_url: &str) -> anyhow::Result<()>;

    fn update_title_bar(&self, title_bar: &TitleBar) -> anyhow::Result<()>;

    /// Start analytics for the selected resource
    ///
    /// Not called when the caller disabled all trackers.
    fn init_tracker(&self, resource: &Resource) -> anyhow::Result<()>;
}
