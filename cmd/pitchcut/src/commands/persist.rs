//! Persist command implementation.
//!
//! Dry-runs the document-store write plan against the in-memory store
//! so operators can check collection routing and batch splitting before
//! pointing the pipeline at the production backend.

use anyhow::{Context, Result};
use pitchcut_model::DeduplicatedEvent;
use pitchcut_store::{persist_match_analysis, MemoryStore};
use std::fs;
use tracing::info;

/// Runs the persist command.
pub async fn run(events_path: &str, match_id: &str) -> Result<()> {
    let content = fs::read_to_string(events_path)
        .with_context(|| format!("Failed to read events file: {events_path}"))?;
    let events: Vec<DeduplicatedEvent> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse events file: {events_path}"))?;

    info!("Planning writes for {} events", events.len());

    let (summary, store) = persist_match_analysis(MemoryStore::new(), match_id, &events, &[], &[])
        .await
        .with_context(|| format!("Persistence dry run failed for match {match_id}"))?;

    info!(
        "Write plan: {} event docs, {} pending reviews, {} possession segments, {} stats",
        summary.events, summary.pending_reviews, summary.possession_segments, summary.stats
    );
    info!("Batch sizes: {:?}", store.batch_sizes());

    Ok(())
}
