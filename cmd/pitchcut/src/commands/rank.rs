//! Rank command implementation.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use pitchcut_analysis::{filter_by_threshold, rank_clips, top_n, MatcherConfig, RankedClip};
use pitchcut_model::{Clip, MatchContext, TimelineEvent};
use serde::Serialize;
use std::fs;
use tracing::info;

/// Arguments for the rank command.
pub struct RankArgs {
    /// Path to the clips JSON.
    pub clips_path: String,
    /// Path to the timeline events JSON.
    pub events_path: String,
    /// Current match minute, when context is available.
    pub minute: Option<f64>,
    /// Total match minutes.
    pub total_minutes: f64,
    /// Goal difference for the team of interest.
    pub score_diff: i32,
    /// Matching tolerance in seconds.
    pub tolerance: f64,
    /// Keep only the N most important clips.
    pub top: Option<usize>,
    /// Keep only clips at or above this importance.
    pub threshold: Option<f64>,
    /// Output format (json or csv).
    pub format: String,
    /// Output path.
    pub output: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankReport<'a> {
    generated_at: String,
    clip_count: usize,
    clips: &'a [RankedClip],
}

/// Runs the rank command.
pub fn run(args: &RankArgs) -> Result<()> {
    let clips_content = fs::read_to_string(&args.clips_path)
        .with_context(|| format!("Failed to read clips file: {}", args.clips_path))?;
    let clips: Vec<Clip> = serde_json::from_str(&clips_content)
        .with_context(|| format!("Failed to parse clips file: {}", args.clips_path))?;

    let events_content = fs::read_to_string(&args.events_path)
        .with_context(|| format!("Failed to read events file: {}", args.events_path))?;
    let events: Vec<TimelineEvent> = serde_json::from_str(&events_content)
        .with_context(|| format!("Failed to parse events file: {}", args.events_path))?;

    info!("Ranking {} clips against {} events", clips.len(), events.len());

    let context = args.minute.map(|minute| MatchContext {
        match_minute: minute,
        total_match_minutes: args.total_minutes,
        score_differential: args.score_diff,
    });

    let matcher = MatcherConfig {
        tolerance: args.tolerance,
    };
    let mut ranked = rank_clips(&clips, &events, context.as_ref(), &matcher);

    if let Some(threshold) = args.threshold {
        ranked = filter_by_threshold(&ranked, threshold);
        info!("{} clips at or above importance {threshold}", ranked.len());
    }
    if let Some(n) = args.top {
        ranked = top_n(&ranked, n);
    }

    for clip in &ranked {
        info!(
            "#{} {} [{:.1}s - {:.1}s] importance {:.3}",
            clip.rank,
            clip.clip.id,
            clip.clip.start_time,
            clip.clip.end_time,
            clip.factors.final_importance
        );
    }

    match args.format.as_str() {
        "json" => {
            let report = RankReport {
                generated_at: Utc::now().to_rfc3339(),
                clip_count: ranked.len(),
                clips: &ranked,
            };
            fs::write(&args.output, serde_json::to_string_pretty(&report)?)
                .with_context(|| format!("Failed to write output file: {}", args.output))?;
        }
        "csv" => {
            let mut writer = csv::Writer::from_path(&args.output)
                .with_context(|| format!("Failed to open output file: {}", args.output))?;
            writer.write_record([
                "rank",
                "clip_id",
                "start_time",
                "end_time",
                "final_importance",
                "base_importance",
                "event_type_boost",
                "context_boost",
                "rarity_boost",
                "match_count",
            ])?;
            for clip in &ranked {
                writer.write_record([
                    clip.rank.to_string(),
                    clip.clip.id.clone(),
                    format!("{:.1}", clip.clip.start_time),
                    format!("{:.1}", clip.clip.end_time),
                    format!("{:.4}", clip.factors.final_importance),
                    format!("{:.4}", clip.factors.base_importance),
                    format!("{:.4}", clip.factors.event_type_boost),
                    format!("{:.4}", clip.factors.context_boost),
                    format!("{:.4}", clip.factors.rarity_boost),
                    clip.matches.len().to_string(),
                ])?;
            }
            writer.flush()?;
        }
        other => bail!("Unsupported output format: {other} (expected json or csv)"),
    }

    info!("Ranked report written to: {}", args.output);
    Ok(())
}
