//! Merge command implementation.

use anyhow::{Context, Result};
use pitchcut_analysis::{merge_halves, HalfAnalysis};
use std::fs;
use tracing::info;

/// Runs the merge command.
pub fn run(first_path: &str, second_path: &str, half_duration: f64, output_path: &str) -> Result<()> {
    let first = load_half(first_path)?;
    let second = load_half(second_path)?;

    info!(
        "Merging halves: {} + {} events, {} + {} clips, {} + {} stats",
        first.events.len(),
        second.events.len(),
        first.clips.len(),
        second.clips.len(),
        first.stats.len(),
        second.stats.len()
    );

    let merged = merge_halves(&first, &second, half_duration);

    info!(
        "Merged match: {} events, {} clips, {} possession segments, {} stats",
        merged.events.len(),
        merged.clips.len(),
        merged.possession_segments.len(),
        merged.stats.len()
    );

    let json = serde_json::to_string_pretty(&merged)?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write output file: {output_path}"))?;

    info!("Merged analysis written to: {output_path}");
    Ok(())
}

fn load_half(path: &str) -> Result<HalfAnalysis> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read half analysis: {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse half analysis: {path}"))
}
