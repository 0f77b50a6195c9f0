//! CLI command implementations

use crate::output::{or_dash, to_json, OutputFormat};
use mediaurn_core::{
    DisableTrackers, ErrorDescriptor, KeySystemValue, PlaybackEnvironment, PlaybackSourceDescriptor,
    PlayerHost, ResolutionPipeline, ResolveContext, ResolverConfig, Resource, TitleBar,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// What the pipeline handed to the host during a resolution
#[derive(Debug, Default)]
struct HostState {
    error: Option<ErrorDescriptor>,
    poster: Option<String>,
    title_bar: Option<TitleBar>,
    tracked: Option<String>,
}

/// Host that keeps the side effects of a resolution for printing
#[derive(Default)]
struct ConsoleHost {
    state: Mutex<HostState>,
}

impl ConsoleHost {
    fn with_state<R>(&self, f: impl FnOnce(&mut HostState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn take(&self) -> HostState {
        self.with_state(std::mem::take)
    }
}

impl PlayerHost for ConsoleHost {
    fn clear_error(&self) {
        self.with_state(|state| state.error = None);
    }

    fn report_error(&self, error: ErrorDescriptor) {
        self.with_state(|state| state.error = Some(error));
    }

    fn update_poster(&self, image_url: &str) -> anyhow::Result<()> {
        self.with_state(|state| state.poster = Some(image_url.to_string()));
        Ok(())
    }

    fn update_title_bar(&self, title_bar: &TitleBar) -> anyhow::Result<()> {
        self.with_state(|state| state.title_bar = Some(title_bar.clone()));
        Ok(())
    }

    fn init_tracker(&self, resource: &Resource) -> anyhow::Result<()> {
        let tracked = resource.id.clone().unwrap_or_else(|| resource.url.clone());
        self.with_state(|state| state.tracked = Some(tracked));
        Ok(())
    }
}

/// Resolve a URN and print the source, or the reported error
///
/// Returns `false` when the resolution ended with an error.
pub async fn resolve(
    config: ResolverConfig,
    environment: PlaybackEnvironment,
    urn: &str,
    disable_trackers: bool,
    format: &str,
) -> anyhow::Result<bool> {
    let host = Arc::new(ConsoleHost::default());
    let pipeline = ResolutionPipeline::new(config, host.clone())?.with_environment(environment);

    let context = ResolveContext {
        disable_trackers: disable_trackers.then_some(DisableTrackers::All(true)),
        media_data: None,
    };

    let source = pipeline.resolve(Some(urn), &context).await?;
    let state = host.take();

    match OutputFormat::from(format) {
        OutputFormat::Json => match (&source, &state.error) {
            (Some(source), _) => println!("{}", to_json(source)),
            (None, Some(error)) => println!("{}", to_json(error)),
            (None, None) => println!("null"),
        },
        OutputFormat::Text => {
            println!("Resolving: {}", urn);
            match &source {
                Some(source) => print_source(source, &state),
                None => print_failure(state.error.as_ref()),
            }
        }
    }

    Ok(source.is_some())
}

fn print_source(source: &PlaybackSourceDescriptor, state: &HostState) {
    println!("\nSource:");
    println!("  URL: {}", source.src);
    println!("  Type: {}", source.mime_type);

    match &source.key_systems {
        Some(key_systems) if !key_systems.is_empty() => {
            println!("  Key systems:");
            for (name, value) in key_systems {
                match value {
                    KeySystemValue::License(license) => println!("    {} -> {}", name, license),
                    KeySystemValue::FairPlay {
                        certificate_uri,
                        license_uri,
                    } => {
                        println!("    {} -> {}", name, license_uri);
                        println!("      certificate: {}", or_dash(certificate_uri.as_deref()));
                    }
                }
            }
        }
        Some(_) => println!("  Key systems: none"),
        None => {}
    }

    if let Some(disable_trackers) = &source.disable_trackers {
        println!("  Disable trackers: {:?}", disable_trackers);
    }

    if let Some(title_bar) = &state.title_bar {
        println!("\nTitle: {}", or_dash(title_bar.title.as_deref()));
        println!("Description: {}", or_dash(title_bar.description.as_deref()));
    }
    if let Some(poster) = &state.poster {
        println!("Poster: {}", poster);
    }
    if let Some(tracked) = &state.tracked {
        println!("Tracking: {}", tracked);
    }
}

fn print_failure(error: Option<&ErrorDescriptor>) {
    let Some(error) = error else {
        println!("\nNo source resolved");
        return;
    };

    println!("\nError {}: {}", error.code, error.message);
    println!("  Type: {}", error.metadata.error_type);
    if let Some(url) = &error.metadata.url {
        println!("  URL: {}", url);
    }
    if let Some(status) = error.metadata.status {
        println!(
            "  Status: {} {}",
            status,
            or_dash(error.metadata.status_text.as_deref())
        );
    }
    if let Some(src) = &error.metadata.src {
        println!("  Source: {} ({})", src.src, src.mime_type);
    }
}

/// One main-chapter resource as reported by `inspect`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceRow {
    url: String,
    protocol: String,
    mime_type: String,
    token_type: String,
    drm: Vec<String>,
    block_reason: Option<String>,
    quality: Option<String>,
    compatible: bool,
    selected: bool,
}

impl ResourceRow {
    fn new(resource: &Resource, selected: Option<&Resource>) -> Self {
        Self {
            url: resource.url.clone(),
            protocol: resource.streaming.to_string(),
            mime_type: resource.mime_type.clone(),
            token_type: resource.token_type.to_string(),
            drm: resource
                .drm_list
                .iter()
                .flatten()
                .map(|entry| entry.drm_type.to_string())
                .collect(),
            block_reason: resource.block_reason.map(|reason| reason.to_string()),
            quality: resource.quality.clone(),
            compatible: resource.streaming.is_supported(),
            selected: selected
                .is_some_and(|s| s.url == resource.url && s.streaming == resource.streaming),
        }
    }
}

/// Print every resource of a URN with its filtering and selection result
pub async fn inspect(
    config: ResolverConfig,
    environment: PlaybackEnvironment,
    urn: &str,
    format: &str,
) -> anyhow::Result<()> {
    let pipeline = ResolutionPipeline::new(config, Arc::new(ConsoleHost::default()))?
        .with_environment(environment);

    let inspection = pipeline.inspect(urn).await?;
    let rows: Vec<ResourceRow> = inspection
        .resources
        .iter()
        .map(|resource| ResourceRow::new(resource, inspection.selected.as_ref()))
        .collect();

    if OutputFormat::from(format) == OutputFormat::Json {
        println!("{}", to_json(&rows));
        return Ok(());
    }

    println!("Inspecting: {}", urn);
    if let Some(chapter) = inspection.composition.main_chapter() {
        println!("  Chapter: {}", or_dash(chapter.title.as_deref()));
        println!("  Vendor: {}", or_dash(chapter.vendor.as_deref()));
    }
    println!(
        "  Resources: {} ({} compatible)",
        inspection.resources.len(),
        inspection.candidates.len()
    );

    println!("\nResources:");
    for (i, row) in rows.iter().enumerate() {
        let drm = if row.drm.is_empty() {
            "-".to_string()
        } else {
            row.drm.join(",")
        };
        let status = match (row.compatible, row.selected) {
            (_, true) => "SELECTED",
            (true, false) => "compatible",
            (false, false) => "filtered",
        };

        println!(
            "  {}. {} {} token={} drm={} blocked={} [{}]",
            i + 1,
            row.protocol,
            row.mime_type,
            row.token_type,
            drm,
            or_dash(row.block_reason.as_deref()),
            status
        );
        println!("     {}", row.url);
    }

    if inspection.selected.is_none() {
        println!("\nNo compatible resource");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediaurn_core::{DrmEntry, DrmType, StreamingProtocol, TokenType};

    #[test]
    fn test_console_host_clears_previous_error() {
        let host = ConsoleHost::default();
        host.report_error(ErrorDescriptor {
            code: ErrorDescriptor::MEDIA_ERR_NETWORK,
            message: "first".to_string(),
            metadata: Default::default(),
        });
        host.clear_error();

        assert!(host.take().error.is_none());
    }

    #[test]
    fn test_console_host_records_tracked_media() {
        let host = ConsoleHost::default();
        let mut resource = Resource::new(StreamingProtocol::Hls, "https://example.ch/master.m3u8");
        host.init_tracker(&resource).unwrap();
        assert_eq!(host.take().tracked.as_deref(), Some("https://example.ch/master.m3u8"));

        resource.id = Some("10313496".to_string());
        host.init_tracker(&resource).unwrap();
        assert_eq!(host.take().tracked.as_deref(), Some("10313496"));
    }

    #[test]
    fn test_resource_row() {
        let resource = Resource::new(StreamingProtocol::Dash, "https://example.ch/a.mpd")
            .with_token_type(TokenType::Akamai)
            .with_drm_list(vec![
                DrmEntry::new(DrmType::Widevine, "https://license.url"),
                DrmEntry::new(DrmType::PlayReady, "https://license.url"),
            ]);

        let row = ResourceRow::new(&resource, Some(&resource));

        assert_eq!(row.protocol, "DASH");
        assert_eq!(row.token_type, "AKAMAI");
        assert_eq!(row.drm, vec!["WIDEVINE", "PLAYREADY"]);
        assert!(row.compatible);
        assert!(row.selected);

        let hds = Resource::new(StreamingProtocol::Hds, "https://example.ch/z/manifest.f4m");
        let row = ResourceRow::new(&hds, Some(&resource));
        assert!(!row.compatible);
        assert!(!row.selected);
    }
}
