//! Detect command implementation.

use anyhow::{Context, Result};
use pitchcut_model::Segment;
use pitchcut_vision::{
    AnalyzerClient, ClientConfig, DetectionRequest, VideoRef, WindowedDetector,
};
use std::fs;
use std::time::{Duration, Instant};
use tracing::info;

/// Runs the detect command.
pub async fn run(
    segments_path: &str,
    video_uri: &str,
    match_id: &str,
    output_path: &str,
    deadline_sec: Option<u64>,
) -> Result<()> {
    let api_key = std::env::var("PITCHCUT_API_KEY")
        .with_context(|| "PITCHCUT_API_KEY environment variable not set")?;

    let client = AnalyzerClient::new(ClientConfig {
        api_key,
        ..Default::default()
    })
    .with_context(|| "Failed to create analyzer client")?;

    let content = fs::read_to_string(segments_path)
        .with_context(|| format!("Failed to read segments file: {segments_path}"))?;
    let segments: Vec<Segment> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse segments file: {segments_path}"))?;

    info!("Loaded {} segments for match {match_id}", segments.len());

    let request = DetectionRequest {
        match_id: match_id.to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        segments,
        video: Some(VideoRef::mp4(video_uri)),
    };

    let deadline = deadline_sec.map(|secs| Instant::now() + Duration::from_secs(secs));
    let detector = WindowedDetector::new(client);
    let summary = detector
        .detect_events_windowed(&request, deadline)
        .await
        .with_context(|| format!("Windowed detection failed for match {match_id}"))?;

    if summary.skipped {
        info!(
            "Detection skipped: {}",
            summary.error.as_deref().unwrap_or("unknown reason")
        );
    } else {
        info!(
            "Detected {} raw events across {} windows",
            summary.raw_event_count, summary.window_count
        );
        for (kind, count) in &summary.events_by_type {
            info!("  {kind}: {count}");
        }
    }

    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write output file: {output_path}"))?;

    info!("Detection summary written to: {output_path}");
    Ok(())
}
