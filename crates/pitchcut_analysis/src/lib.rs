//! Event deduplication, clip scoring and half merging for Pitchcut.
//!
//! This crate holds the pure in-memory transforms of the pipeline:
//! - Deduplication of raw events across window overlaps
//! - Dynamic clip-window calculation around events
//! - Clip-to-event matching and multi-factor importance scoring
//! - Set-piece outcome analysis
//! - Half merging (timeline shift plus stat combination)
//!
//! Every transform accepts empty input and returns empty output; none of
//! them block or touch shared state.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]

pub mod clip_window;
pub mod color;
pub mod dedup;
pub mod halves;
pub mod importance;
pub mod matcher;
pub mod outcome;

pub use clip_window::{dynamic_window, DynamicWindow};
pub use color::{hue_distance, hue_matches};
pub use dedup::{
    deduplicate, deduplicate_with_stats, rededuplicate, DedupConfig, DedupStats, KindStats,
};
pub use halves::{is_count_metric, merge_halves, merge_stats, HalfAnalysis};
pub use importance::{
    base_weight, event_importance_boost, filter_by_threshold, rank_clips, score_clip, top_n,
    ClipImportanceFactors, RankedClip,
};
pub use matcher::{match_clip_to_events, ClipEventMatch, MatchKind, MatcherConfig};
pub use outcome::{
    analyze_set_piece_outcomes, OutcomeKind, SetPieceOutcome, DEFAULT_OUTCOME_WINDOW_SEC,
};
