//! Dedup command implementation.

use anyhow::{Context, Result};
use pitchcut_analysis::{deduplicate_with_stats, DedupConfig};
use pitchcut_model::RawEvent;
use pitchcut_vision::DetectionSummary;
use std::fs;
use tracing::info;

/// Runs the dedup command.
///
/// Accepts either a detection summary or a bare raw-event array.
pub fn run(input_path: &str, output_path: &str, time_threshold: f64) -> Result<()> {
    let content = fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read input file: {input_path}"))?;

    let raw_events: Vec<RawEvent> = match serde_json::from_str::<DetectionSummary>(&content) {
        Ok(summary) => summary.raw_events,
        Err(_) => serde_json::from_str(&content)
            .with_context(|| format!("Input is neither a detection summary nor a raw-event array: {input_path}"))?,
    };

    info!("Loaded {} raw events", raw_events.len());

    let config = DedupConfig {
        time_threshold,
        ..DedupConfig::default()
    };
    let (events, stats) = deduplicate_with_stats(&raw_events, &config);

    info!(
        "Deduplicated {} raw events into {} ({} merged, {} unique, {:.2} avg cluster size)",
        stats.total_raw_events,
        stats.total_deduplicated_events,
        stats.merged_count,
        stats.unique_count,
        stats.average_cluster_size
    );
    for (kind, counters) in &stats.by_type {
        info!(
            "  {kind}: {} -> {} ({} merged)",
            counters.raw, counters.deduplicated, counters.merged_count
        );
    }

    let json = serde_json::to_string_pretty(&events)?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write output file: {output_path}"))?;

    info!("Deduplicated events written to: {output_path}");
    Ok(())
}
