//! Clip-to-event temporal matching.
//!
//! Classifies how each timeline event sits relative to a clip: inside
//! it (`exact`), just beyond its edges (`overlap`), or nearby
//! (`proximity`). Offsets are measured from the clip center against the
//! clip half-duration `h`; the `overlap` band extends one tolerance
//! beyond `h` and the `proximity` band one tolerance further.

use crate::importance::event_importance_boost;
use pitchcut_model::{Clip, TimelineEvent};
use serde::{Deserialize, Serialize};

/// Relative placement of a matched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The event timestamp lies inside the clip.
    Exact,
    /// The event lies within one tolerance of the clip edge.
    Overlap,
    /// The event lies within two tolerances of the clip edge.
    Proximity,
}

/// A match between a clip and a timeline event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipEventMatch {
    /// The clip.
    pub clip_id: String,
    /// The matched event.
    pub event_id: String,
    /// Placement classification.
    pub match_type: MatchKind,
    /// Match confidence in `[0, 1]`.
    pub confidence: f64,
    /// Distance from the event to the nearest clip bound, in seconds
    /// (0 when the event lies inside the clip).
    pub temporal_offset: f64,
    /// Importance boost of the matched event.
    pub importance_boost: f64,
}

/// Configuration for clip-event matching.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Band width in seconds beyond the clip edge for `overlap` and
    /// `proximity` matches.
    pub tolerance: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self { tolerance: 2.0 }
    }
}

/// Matches `clip` against `events`, sorted by confidence descending.
///
/// An invalid clip (non-positive or non-finite duration) matches
/// nothing.
#[must_use]
pub fn match_clip_to_events(
    clip: &Clip,
    events: &[TimelineEvent],
    config: &MatcherConfig,
) -> Vec<ClipEventMatch> {
    if !clip.is_valid() {
        return Vec::new();
    }

    let center = clip.center();
    let half = clip.duration() / 2.0;
    let tolerance = config.tolerance;

    let mut matches: Vec<ClipEventMatch> = events
        .iter()
        .filter_map(|event| {
            let offset = (event.timestamp - center).abs();
            let inside = event.timestamp >= clip.start_time && event.timestamp <= clip.end_time;

            let (match_type, confidence) = if inside {
                (
                    MatchKind::Exact,
                    (1.0 - (offset / half) * 0.3).max(0.7),
                )
            } else if tolerance > 0.0 && offset <= half + tolerance {
                (
                    MatchKind::Overlap,
                    (0.7 - ((offset - half) / tolerance) * 0.3).max(0.4),
                )
            } else if tolerance > 0.0 && offset <= half + 2.0 * tolerance {
                (
                    MatchKind::Proximity,
                    (0.4 - ((offset - half - tolerance) / tolerance) * 0.2).max(0.2),
                )
            } else {
                return None;
            };

            Some(ClipEventMatch {
                clip_id: clip.id.clone(),
                event_id: event.id.clone(),
                match_type,
                confidence,
                temporal_offset: (offset - half).max(0.0),
                importance_boost: event_importance_boost(event.kind, event.details.as_ref()),
            })
        })
        .collect();

    matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    matches
}
