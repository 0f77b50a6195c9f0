//! DRM - key-system configuration for protected resources
//!
//! Maps the DRM schemes a resource advertises onto the key-system
//! identifiers an EME-capable player expects:
//! - Widevine (Chrome, Android, Chromecast)
//! - PlayReady (Edge, Windows)
//! - FairPlay (Safari, iOS, tvOS)
//!
//! License acquisition itself is left to the downstream player.

use crate::types::{DrmEntry, DrmType, KeySystemValue, KeySystems, Resource};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// DRM systems with a known key-system identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrmSystem {
    Widevine,
    PlayReady,
    FairPlay,
}

impl DrmSystem {
    /// Map a wire DRM type; unknown schemes have no system
    pub fn from_drm_type(drm_type: DrmType) -> Option<Self> {
        match drm_type {
            DrmType::Widevine => Some(DrmSystem::Widevine),
            DrmType::PlayReady => Some(DrmSystem::PlayReady),
            DrmType::FairPlay => Some(DrmSystem::FairPlay),
            DrmType::Unknown => None,
        }
    }

    /// Returns the EME key-system identifier
    pub fn key_system(&self) -> &'static str {
        match self {
            DrmSystem::Widevine => "com.widevine.alpha",
            DrmSystem::PlayReady => "com.microsoft.playready",
            DrmSystem::FairPlay => "com.apple.fps.1_0",
        }
    }

    /// Build the key-system value for a DRM entry
    fn value_for(&self, entry: &DrmEntry) -> KeySystemValue {
        match self {
            DrmSystem::Widevine | DrmSystem::PlayReady => {
                KeySystemValue::License(entry.license_url.clone())
            }
            DrmSystem::FairPlay => KeySystemValue::FairPlay {
                certificate_uri: entry.certificate_url.clone(),
                license_uri: entry.license_url.clone(),
            },
        }
    }
}

/// Build the key-system map for a DRM list
pub fn key_systems_for(drm_list: &[DrmEntry]) -> KeySystems {
    let mut key_systems = KeySystems::new();

    for entry in drm_list {
        match DrmSystem::from_drm_type(entry.drm_type) {
            Some(system) => {
                key_systems.insert(system.key_system().to_string(), system.value_for(entry));
            }
            None => {
                warn!(license_url = %entry.license_url, "Ignoring unknown DRM type");
            }
        }
    }

    key_systems
}

/// Attaches key-system configuration to resources
pub struct KeySystemMapper;

impl KeySystemMapper {
    /// Populate `key_systems` on every resource
    ///
    /// When no resource carries a DRM list at all, the resources are returned
    /// unmodified. Otherwise every resource gets a map, empty for those
    /// without DRM, which confirms they are DRM-free. Resources are never
    /// dropped or reordered.
    pub fn map_key_systems(resources: Vec<Resource>) -> Vec<Resource> {
        if !resources.iter().any(|resource| resource.drm_list.is_some()) {
            return resources;
        }

        resources
            .into_iter()
            .map(|mut resource| {
                let drm_list = resource.drm_list.as_deref().unwrap_or_default();
                resource.key_systems = Some(key_systems_for(drm_list));
                resource
            })
            .collect()
    }
}
