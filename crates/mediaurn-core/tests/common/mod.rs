//! Fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use mediaurn_core::{
    ErrorDescriptor, Error, ImageScaler, MediaComposition, MetadataClient, PlayerHost, Resource,
    Result, TitleBar, TokenService,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const BASE_URL: &str = "https://il.mock.ch/integrationlayer/2.1/";

pub const VIDEO_URN: &str = "urn:rts:video:10313496";
pub const AUDIO_URN: &str = "urn:rts:audio:3262320";

pub fn video_composition() -> MediaComposition {
    MediaComposition::from_json(include_str!("../fixtures/urn_rts_video_10313496.json")).unwrap()
}

pub fn audio_composition() -> MediaComposition {
    MediaComposition::from_json(include_str!("../fixtures/urn_rts_audio_3262320.json")).unwrap()
}

/// Serves compositions by URN, answering 404 for anything else
#[derive(Default)]
pub struct FakeMetadataClient {
    compositions: HashMap<String, MediaComposition>,
    pub calls: AtomicUsize,
}

impl FakeMetadataClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serving(mut self, urn: &str, composition: MediaComposition) -> Self {
        self.compositions.insert(urn.to_string(), composition);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataClient for FakeMetadataClient {
    async fn fetch_by_urn(&self, urn: &str) -> Result<MediaComposition> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Let concurrent resolutions interleave
        tokio::task::yield_now().await;

        self.compositions
            .get(urn)
            .cloned()
            .ok_or_else(|| Error::MetadataFetch {
                url: format!("{BASE_URL}mediaComposition/byUrn/{urn}?onlyChapters=true&vector=portalplay"),
                status: Some(404),
                status_text: "Not Found".to_string(),
            })
    }

    fn base_url(&self) -> &str {
        BASE_URL
    }
}

/// Appends a fake token, or fails every exchange
#[derive(Default)]
pub struct FakeTokenService {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeTokenService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenService for FakeTokenService {
    async fn tokenize(&self, mut resource: Resource) -> Result<Resource> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::TokenFetch {
                url: "https://tp.mock.ch/akahd/token?acl=%2Faudio%2F*".to_string(),
                status: Some(403),
                status_text: "Forbidden".to_string(),
            });
        }
        resource.url = format!("{}?hdnts=fake-token", resource.url);
        Ok(resource)
    }
}

pub struct FakeImageScaler;

impl ImageScaler for FakeImageScaler {
    fn scale(&self, image_url: &str) -> Result<String> {
        Ok(format!("https://mock-scale.ch/{image_url}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    ClearError,
    Error(ErrorDescriptor),
    Poster(String),
    TitleBar(TitleBar),
    Tracker(String),
}

/// Records every call made by the pipeline
#[derive(Default)]
pub struct RecordingHost {
    pub events: Mutex<Vec<HostEvent>>,
    pub fail_poster: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_poster() -> Self {
        Self {
            fail_poster: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<ErrorDescriptor> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Error(error) => Some(error),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl PlayerHost for RecordingHost {
    fn clear_error(&self) {
        self.push(HostEvent::ClearError);
    }

    fn report_error(&self, error: ErrorDescriptor) {
        self.push(HostEvent::Error(error));
    }

    fn update_poster(&self, image_url: &str) -> anyhow::Result<()> {
        if self.fail_poster {
            anyhow::bail!("poster element detached");
        }
        self.push(HostEvent::Poster(image_url.to_string()));
        Ok(())
    }

    fn update_title_bar(&self, title_bar: &TitleBar) -> anyhow::Result<()> {
        self.push(HostEvent::TitleBar(title_bar.clone()));
        Ok(())
    }

    fn init_tracker(&self, resource: &Resource) -> anyhow::Result<()> {
        self.push(HostEvent::Tracker(resource.url.clone()));
        Ok(())
    }
}
