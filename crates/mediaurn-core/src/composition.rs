//! Media composition - the metadata document fetched for a URN
//!
//! A composition is a list of chapters (each optionally split into segments);
//! the chapter whose URN matches `chapterUrn` is the one being played.

use crate::types::{deserialize_block_reason, BlockReason, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Segment of a chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub urn: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub mark_in: Option<u64>,
    #[serde(default)]
    pub mark_out: Option<u64>,
    #[serde(
        default,
        deserialize_with = "deserialize_block_reason",
        skip_serializing_if = "Option::is_none"
    )]
    pub block_reason: Option<BlockReason>,
}

/// Chapter of a media composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub urn: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_copyright: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_block_reason",
        skip_serializing_if = "Option::is_none"
    )]
    pub block_reason: Option<BlockReason>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resource_list: Vec<Resource>,
    #[serde(default)]
    pub segment_list: Vec<Segment>,
}

/// Metadata document describing a media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaComposition {
    pub chapter_urn: String,
    #[serde(default)]
    pub chapter_list: Vec<Chapter>,
}

impl MediaComposition {
    /// Parse a composition from its JSON representation
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::MetadataParse(e.to_string()))
    }

    /// The chapter being played
    pub fn main_chapter(&self) -> Option<&Chapter> {
        self.chapter_list
            .iter()
            .find(|chapter| chapter.urn == self.chapter_urn)
    }

    /// Resources of the main chapter, each carrying the chapter's
    /// descriptive metadata and block reason
    pub fn main_resources(&self) -> Vec<Resource> {
        let Some(chapter) = self.main_chapter() else {
            return Vec::new();
        };

        chapter
            .resource_list
            .iter()
            .cloned()
            .map(|mut resource| {
                resource.block_reason = chapter.block_reason;
                resource.vendor = chapter.vendor.clone();
                resource.title = chapter.title.clone();
                resource.id = chapter.id.clone();
                resource.media_type = chapter.media_type.clone();
                resource.image_copyright = chapter.image_copyright.clone();
                resource
            })
            .collect()
    }

    /// Image of the main chapter
    pub fn main_chapter_image_url(&self) -> Option<&str> {
        self.main_chapter()?.image_url.as_deref()
    }
}
