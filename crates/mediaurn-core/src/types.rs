//! Core types for Mediaurn

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for a single resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionId(pub Uuid);

impl ResolutionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResolutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResolutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery protocol of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamingProtocol {
    Hls,
    Dash,
    Progressive,
    M4a,
    Hds,
    Rtmp,
    #[serde(other)]
    Unknown,
}

impl StreamingProtocol {
    /// Whether the target runtime can play this protocol
    pub fn is_supported(&self) -> bool {
        match self {
            StreamingProtocol::Hls
            | StreamingProtocol::Dash
            | StreamingProtocol::Progressive
            | StreamingProtocol::M4a => true,
            StreamingProtocol::Hds | StreamingProtocol::Rtmp | StreamingProtocol::Unknown => false,
        }
    }
}

impl std::fmt::Display for StreamingProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamingProtocol::Hls => write!(f, "HLS"),
            StreamingProtocol::Dash => write!(f, "DASH"),
            StreamingProtocol::Progressive => write!(f, "PROGRESSIVE"),
            StreamingProtocol::M4a => write!(f, "M4A"),
            StreamingProtocol::Hds => write!(f, "HDS"),
            StreamingProtocol::Rtmp => write!(f, "RTMP"),
            StreamingProtocol::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Access token scheme required by a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    #[default]
    None,
    Akamai,
    #[serde(other)]
    Unknown,
}

impl TokenType {
    /// A token scheme this crate knows how to satisfy
    pub fn is_recognized(&self) -> bool {
        match self {
            TokenType::Akamai => true,
            TokenType::None | TokenType::Unknown => false,
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::None => write!(f, "NONE"),
            TokenType::Akamai => write!(f, "AKAMAI"),
            TokenType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// DRM scheme offered for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DrmType {
    Widevine,
    PlayReady,
    FairPlay,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for DrmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrmType::Widevine => write!(f, "WIDEVINE"),
            DrmType::PlayReady => write!(f, "PLAYREADY"),
            DrmType::FairPlay => write!(f, "FAIRPLAY"),
            DrmType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Reason a media item is legally or editorially unplayable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BlockReason {
    Geoblock,
    Legal,
    Commercial,
    AgeRating18,
    AgeRating12,
    StartDate,
    EndDate,
    Journalistic,
    VpnProxyDetected,
    #[serde(other)]
    Unknown,
}

impl BlockReason {
    /// Wire name, also used as the localization key
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::Geoblock => "GEOBLOCK",
            BlockReason::Legal => "LEGAL",
            BlockReason::Commercial => "COMMERCIAL",
            BlockReason::AgeRating18 => "AGERATING18",
            BlockReason::AgeRating12 => "AGERATING12",
            BlockReason::StartDate => "STARTDATE",
            BlockReason::EndDate => "ENDDATE",
            BlockReason::Journalistic => "JOURNALISTIC",
            BlockReason::VpnProxyDetected => "VPNPROXYDETECTED",
            BlockReason::Unknown => "UNKNOWN",
        }
    }

    /// Parse a wire name; anything unrecognized maps to `Unknown`
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "GEOBLOCK" => BlockReason::Geoblock,
            "LEGAL" => BlockReason::Legal,
            "COMMERCIAL" => BlockReason::Commercial,
            "AGERATING18" => BlockReason::AgeRating18,
            "AGERATING12" => BlockReason::AgeRating12,
            "STARTDATE" => BlockReason::StartDate,
            "ENDDATE" => BlockReason::EndDate,
            "JOURNALISTIC" => BlockReason::Journalistic,
            "VPNPROXYDETECTED" => BlockReason::VpnProxyDetected,
            _ => BlockReason::Unknown,
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treats a missing, null or blank block reason as "not blocked"
pub(crate) fn deserialize_block_reason<'de, D>(deserializer: D) -> Result<Option<BlockReason>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|value| !value.trim().is_empty())
        .map(|value| BlockReason::from_wire(&value)))
}

/// Treats an explicit `null` like a missing key
pub(crate) fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One DRM scheme offered for a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrmEntry {
    #[serde(rename = "type")]
    pub drm_type: DrmType,
    pub license_url: String,
    /// FairPlay only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
}

impl DrmEntry {
    pub fn new(drm_type: DrmType, license_url: impl Into<String>) -> Self {
        Self {
            drm_type,
            license_url: license_url.into(),
            certificate_url: None,
        }
    }

    pub fn fairplay(license_url: impl Into<String>, certificate_url: impl Into<String>) -> Self {
        Self {
            drm_type: DrmType::FairPlay,
            license_url: license_url.into(),
            certificate_url: Some(certificate_url.into()),
        }
    }
}

/// Value attached to a key-system identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySystemValue {
    /// License server URL
    License(String),
    /// FairPlay needs both a certificate and a license server
    #[serde(rename_all = "camelCase")]
    FairPlay {
        certificate_uri: Option<String>,
        license_uri: String,
    },
}

/// Key-system identifier to configuration
pub type KeySystems = BTreeMap<String, KeySystemValue>;

/// One alternative way to deliver a media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub url: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub mime_type: String,
    pub streaming: StreamingProtocol,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub token_type: TokenType,
    /// Informational tie-break hint, never used for ranking
    #[serde(default, rename = "isFirst", deserialize_with = "deserialize_null_default")]
    pub is_first: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drm_list: Option<Vec<DrmEntry>>,
    /// Populated by the key-system mapper
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_systems: Option<KeySystems>,
    #[serde(
        default,
        deserialize_with = "deserialize_block_reason",
        skip_serializing_if = "Option::is_none"
    )]
    pub block_reason: Option<BlockReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub live: bool,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub dvr: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics_metadata: Option<serde_json::Value>,
}

impl Resource {
    /// Create a resource with only its protocol and URL set
    pub fn new(streaming: StreamingProtocol, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: String::new(),
            streaming,
            token_type: TokenType::None,
            is_first: false,
            drm_list: None,
            key_systems: None,
            block_reason: None,
            quality: None,
            presentation: None,
            live: false,
            dvr: false,
            vendor: None,
            title: None,
            id: None,
            media_type: None,
            image_copyright: None,
            event_data: None,
            analytics_data: None,
            analytics_metadata: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = mime_type.to_string();
        self
    }

    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    pub fn with_drm_list(mut self, drm_list: Vec<DrmEntry>) -> Self {
        self.drm_list = Some(drm_list);
        self
    }

    pub fn with_block_reason(mut self, reason: BlockReason) -> Self {
        self.block_reason = Some(reason);
        self
    }

    pub fn first(mut self, is_first: bool) -> Self {
        self.is_first = is_first;
        self
    }
}

/// Trackers to switch off for a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisableTrackers {
    All(bool),
    Named(Vec<String>),
}

/// Caller-supplied context for one resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveContext {
    #[serde(default)]
    pub disable_trackers: Option<DisableTrackers>,
    #[serde(default)]
    pub media_data: Option<serde_json::Value>,
}

/// Final output handed to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSourceDescriptor {
    pub src: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub key_systems: Option<KeySystems>,
    pub disable_trackers: Option<DisableTrackers>,
    pub media_data: Option<serde_json::Value>,
}

/// Diagnostic context attached to an error descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMetadata {
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<PlaybackSourceDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
}

/// Error surfaced to the player's error sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub code: u16,
    pub message: String,
    pub metadata: ErrorMetadata,
}

impl ErrorDescriptor {
    pub const MEDIA_ERR_ABORTED: u16 = 1;
    pub const MEDIA_ERR_NETWORK: u16 = 2;
    pub const MEDIA_ERR_SRC_NOT_SUPPORTED: u16 = 4;
}

/// Title bar content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleBar {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Runtime the selected source will play in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackEnvironment {
    /// Any Safari-family browser (desktop, iOS, embedded WebKit)
    pub any_safari: bool,
    /// Whether adaptive streams behind a dynamic token can be played
    pub tokenized_adaptive_streaming: bool,
}

impl Default for PlaybackEnvironment {
    fn default() -> Self {
        Self {
            any_safari: false,
            tokenized_adaptive_streaming: true,
        }
    }
}

impl PlaybackEnvironment {
    pub fn safari() -> Self {
        Self {
            any_safari: true,
            ..Default::default()
        }
    }
}

/// Resolution state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionState {
    /// Nothing requested yet
    Idle,
    /// Media composition requested
    Fetching,
    /// Filtering, key-system mapping and tokenization
    Filtering,
    /// Picking the resource
    Selecting,
    /// Selected resource is blocked
    BlockedError,
    /// Fetch, tokenization or selection failed
    ResolutionError,
    /// Descriptor composed
    Resolved,
}

impl ResolutionState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: ResolutionState) -> bool {
        use ResolutionState::*;
        matches!(
            (self, target),
            (Idle, Fetching) |
            (Fetching, Filtering) | (Fetching, ResolutionError) |
            (Filtering, Selecting) | (Filtering, ResolutionError) |
            (Selecting, BlockedError) | (Selecting, ResolutionError) | (Selecting, Resolved)
        )
    }

    /// No further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResolutionState::BlockedError | ResolutionState::ResolutionError | ResolutionState::Resolved
        )
    }
}

impl std::fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionState::Idle => write!(f, "idle"),
            ResolutionState::Fetching => write!(f, "fetching"),
            ResolutionState::Filtering => write!(f, "filtering"),
            ResolutionState::Selecting => write!(f, "selecting"),
            ResolutionState::BlockedError => write!(f, "blocked"),
            ResolutionState::ResolutionError => write!(f, "error"),
            ResolutionState::Resolved => write!(f, "resolved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_wire_values_fall_back() {
        let resource: Resource = serde_json::from_value(serde_json::json!({
            "url": "rtmp://example.ch/live",
            "streaming": "SMOOTH",
            "tokenType": "SIGNED"
        }))
        .unwrap();

        assert_eq!(resource.streaming, StreamingProtocol::Unknown);
        assert_eq!(resource.token_type, TokenType::Unknown);
        assert!(!resource.streaming.is_supported());
    }

    #[test]
    fn test_blank_block_reason_is_not_blocked() {
        let resource: Resource = serde_json::from_value(serde_json::json!({
            "url": "https://example.ch/master.m3u8",
            "streaming": "HLS",
            "blockReason": ""
        }))
        .unwrap();
        assert_eq!(resource.block_reason, None);

        let resource: Resource = serde_json::from_value(serde_json::json!({
            "url": "https://example.ch/master.m3u8",
            "streaming": "HLS",
            "blockReason": "STARTDATE"
        }))
        .unwrap();
        assert_eq!(resource.block_reason, Some(BlockReason::StartDate));
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let resource: Resource = serde_json::from_value(serde_json::json!({
            "url": "https://example.ch/master.m3u8",
            "streaming": "HLS",
            "mimeType": null,
            "tokenType": null,
            "isFirst": null,
            "live": null,
            "dvr": null
        }))
        .unwrap();

        assert_eq!(resource.mime_type, "");
        assert_eq!(resource.token_type, TokenType::None);
        assert!(!resource.is_first);
        assert!(!resource.live);
        assert!(!resource.dvr);
    }

    #[test]
    fn test_descriptor_keeps_absent_keys() {
        let descriptor = PlaybackSourceDescriptor {
            src: "https://example.ch/manifest.mpd".to_string(),
            mime_type: "application/dash+xml".to_string(),
            key_systems: None,
            disable_trackers: None,
            media_data: None,
        };

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["type"], "application/dash+xml");
        assert!(json.as_object().unwrap().contains_key("keySystems"));
        assert!(json["keySystems"].is_null());
        assert!(json["mediaData"].is_null());
    }

    #[test]
    fn test_resolution_state_transitions() {
        use ResolutionState::*;

        assert!(Idle.can_transition_to(Fetching));
        assert!(Selecting.can_transition_to(BlockedError));
        assert!(!Idle.can_transition_to(Resolved));
        assert!(!Resolved.can_transition_to(Fetching));
        assert!(Resolved.is_terminal());
        assert!(!Filtering.is_terminal());
    }
}
