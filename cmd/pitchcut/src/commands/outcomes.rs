//! Outcomes command implementation.

use anyhow::{Context, Result};
use pitchcut_analysis::analyze_set_piece_outcomes;
use pitchcut_model::{TimelineEvent, TimelineEventKind};
use std::fs;
use tracing::info;

/// Runs the outcomes command.
pub fn run(events_path: &str, window_sec: f64) -> Result<()> {
    let content = fs::read_to_string(events_path)
        .with_context(|| format!("Failed to read events file: {events_path}"))?;
    let events: Vec<TimelineEvent> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse events file: {events_path}"))?;

    let set_pieces: Vec<TimelineEvent> = events
        .iter()
        .filter(|e| e.kind == TimelineEventKind::SetPiece)
        .cloned()
        .collect();

    info!(
        "Analyzing {} set pieces out of {} events",
        set_pieces.len(),
        events.len()
    );

    let outcomes = analyze_set_piece_outcomes(&set_pieces, &events, window_sec);

    for (set_piece, outcome) in set_pieces.iter().zip(&outcomes) {
        info!(
            "{} @ {:.1}s -> {:?} after {:.1}s (scoring chance: {})",
            set_piece.id,
            set_piece.timestamp,
            outcome.result_type,
            outcome.time_to_outcome,
            outcome.scoring_chance
        );
    }

    let report: Vec<serde_json::Value> = set_pieces
        .iter()
        .zip(&outcomes)
        .map(|(sp, outcome)| {
            serde_json::json!({
                "setPieceId": sp.id,
                "timestamp": sp.timestamp,
                "outcome": outcome,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
