//! Mediaurn Core - Media URN resolution for video and audio players
//!
//! This crate turns an opaque media URN into a playable source description:
//! - Media composition fetching from the integration layer
//! - Filtering of resources the runtime cannot play
//! - DRM key-system configuration (Widevine, PlayReady, FairPlay)
//! - Akamai token exchange for protected resources
//! - Environment-aware resource selection
//! - Blocked-content and network error reporting
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Resolution Pipeline                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │   Metadata   │  │   Resource   │  │  Key System  │           │
//! │  │    Client    │─▶│    Filter    │─▶│    Mapper    │           │
//! │  └──────────────┘  └──────────────┘  └──────┬───────┘           │
//! │                                             │                   │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────┴───────┐           │
//! │  │    Source    │◀─│   Resource   │◀─│    Token     │           │
//! │  │   Composer   │  │   Selector   │  │   Decorator  │           │
//! │  └──────┬───────┘  └──────────────┘  └──────────────┘           │
//! │         │                                                       │
//! │  ┌──────┴───────┐                                               │
//! │  │ Player Host  │  error sink, poster, title bar                │
//! │  └──────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod composition;
pub mod provider;
pub mod filter;
pub mod drm;
pub mod token;
pub mod selector;
pub mod source;
pub mod image;
pub mod host;
pub mod pipeline;

pub use error::{Error, RequestFailure, Result};
pub use types::*;
pub use config::ResolverConfig;
pub use composition::{Chapter, MediaComposition, Segment};
pub use provider::{DataProvider, MetadataClient};
pub use filter::ResourceFilter;
pub use drm::{DrmSystem, KeySystemMapper};
pub use token::{AkamaiTokenService, TokenDecorator, TokenService};
pub use selector::ResourceSelector;
pub use source::SourceComposer;
pub use image::{ImageScaler, ImageService};
pub use host::PlayerHost;
pub use pipeline::{Inspection, ResolutionOutcome, ResolutionPipeline, ResolvedSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Mediaurn Core initialized");
}
