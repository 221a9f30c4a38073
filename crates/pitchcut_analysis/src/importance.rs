//! Clip importance scoring and ranking.
//!
//! A clip's importance composes four factors: the strongest matched
//! event, secondary matched events at decaying weight, match context
//! (late game, close score, comeback), and the rarity of the matched
//! event kinds. All factors and the final score stay inside `[0, 1]`.

use crate::matcher::{match_clip_to_events, ClipEventMatch, MatcherConfig};
use pitchcut_model::{
    Clip, EventDetails, MatchContext, ShotKind, ShotResult, TimelineEvent, TimelineEventKind,
    TurnoverKind,
};
use serde::{Deserialize, Serialize};

/// Base importance weight of a goal; also the reference for the
/// comeback context boost.
pub const GOAL_WEIGHT: f64 = 1.0;

/// Base importance weight per event kind.
#[must_use]
pub const fn base_weight(kind: TimelineEventKind) -> f64 {
    match kind {
        TimelineEventKind::Goal => GOAL_WEIGHT,
        TimelineEventKind::Penalty => 0.95,
        TimelineEventKind::RedCard => 0.9,
        TimelineEventKind::OwnGoal => 0.85,
        TimelineEventKind::Save => 0.75,
        TimelineEventKind::Shot => 0.7,
        TimelineEventKind::Chance => 0.65,
        TimelineEventKind::KeyPass => 0.6,
        TimelineEventKind::Foul | TimelineEventKind::YellowCard => 0.55,
        TimelineEventKind::SetPiece | TimelineEventKind::Tackle => 0.5,
        TimelineEventKind::Turnover => 0.45,
        TimelineEventKind::Pass | TimelineEventKind::Other => 0.3,
        TimelineEventKind::Carry => 0.25,
    }
}

/// Importance boost of one event: base weight modulated by its details,
/// clamped to `1.0`.
#[must_use]
pub fn event_importance_boost(kind: TimelineEventKind, details: Option<&EventDetails>) -> f64 {
    let mut boost = base_weight(kind);

    if let Some(details) = details {
        match kind {
            TimelineEventKind::Shot => {
                // A converted shot scores as the goal it is.
                if details.shot_result == Some(ShotResult::Goal) {
                    boost = GOAL_WEIGHT;
                }
                if details.is_on_target == Some(true) {
                    boost *= 1.2;
                }
                if details.shot_type == Some(ShotKind::LongRange) {
                    boost *= 1.1;
                }
            }
            TimelineEventKind::Tackle => {
                if details.won_tackle == Some(true) {
                    boost *= 1.3;
                }
            }
            TimelineEventKind::Turnover => {
                if details.turnover_type == Some(TurnoverKind::Interception) {
                    boost *= 1.2;
                }
            }
            _ => {}
        }
    }

    boost.min(1.0)
}

/// The factor breakdown behind one clip's importance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipImportanceFactors {
    /// Strongest matched event, weighted by match confidence.
    pub base_importance: f64,
    /// Secondary matched events at decaying weight.
    pub event_type_boost: f64,
    /// Match-context contribution (late game, close score, comeback).
    pub context_boost: f64,
    /// Rarity contribution of the matched event kinds.
    pub rarity_boost: f64,
    /// Sum of the factors, clamped to `[0, 1]`.
    pub final_importance: f64,
}

/// Importance of a clip with no matched events.
const UNMATCHED_BASE: f64 = 0.1;

/// Kinds inferred back from an importance boost, rarest first.
///
/// The boost is lossy (detail modifiers fold into it), so rarity works
/// from threshold bands rather than the original kind.
fn infer_kind_from_boost(boost: f64) -> Option<TimelineEventKind> {
    if boost >= 0.95 {
        Some(TimelineEventKind::Goal)
    } else if boost >= 0.9 {
        Some(TimelineEventKind::Penalty)
    } else if boost >= 0.85 {
        Some(TimelineEventKind::RedCard)
    } else if boost >= 0.8 {
        Some(TimelineEventKind::OwnGoal)
    } else if boost >= 0.7 {
        Some(TimelineEventKind::Shot)
    } else if boost >= 0.6 {
        Some(TimelineEventKind::KeyPass)
    } else if boost >= 0.5 {
        Some(TimelineEventKind::Tackle)
    } else {
        None
    }
}

/// How rarely a kind occurs in a match; kinds not listed contribute no
/// rarity.
fn rarity(kind: TimelineEventKind) -> f64 {
    match kind {
        TimelineEventKind::OwnGoal => 0.9,
        TimelineEventKind::RedCard => 0.85,
        TimelineEventKind::Penalty => 0.8,
        TimelineEventKind::Goal => 0.7,
        TimelineEventKind::Save => 0.6,
        TimelineEventKind::YellowCard => 0.4,
        _ => 0.0,
    }
}

/// Scores one clip from its matches (sorted by confidence descending)
/// and optional match context.
#[must_use]
pub fn score_clip(
    matches: &[ClipEventMatch],
    context: Option<&MatchContext>,
) -> ClipImportanceFactors {
    let Some(best) = matches.first() else {
        return ClipImportanceFactors {
            base_importance: UNMATCHED_BASE,
            event_type_boost: 0.0,
            context_boost: 0.0,
            rarity_boost: 0.0,
            final_importance: UNMATCHED_BASE,
        };
    };

    let base_importance = best.importance_boost * best.confidence;

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let secondary: f64 = matches
        .iter()
        .enumerate()
        .take(3)
        .skip(1)
        .map(|(i, m)| m.importance_boost * m.confidence * 0.5f64.powi(i as i32))
        .sum();
    let event_type_boost = 0.3 * secondary;

    let mut context_boost = 0.0;
    if let Some(ctx) = context {
        let progress = ctx.progress();
        if progress > 0.8 {
            context_boost += 0.15 * (progress - 0.8) / 0.2;
        }
        if ctx.score_differential.abs() <= 1 {
            context_boost += 0.1;
        }
        let has_goal_class_match = matches.iter().any(|m| m.importance_boost >= GOAL_WEIGHT);
        if has_goal_class_match && ctx.score_differential < 0 {
            context_boost += 0.15;
        }
    }
    context_boost = context_boost.min(0.3);

    let rarity_boost = matches
        .iter()
        .filter_map(|m| {
            infer_kind_from_boost(m.importance_boost).map(|kind| rarity(kind) * m.confidence)
        })
        .fold(0.0f64, f64::max)
        * 0.2;

    let final_importance =
        (base_importance + event_type_boost + context_boost + rarity_boost).clamp(0.0, 1.0);

    ClipImportanceFactors {
        base_importance,
        event_type_boost,
        context_boost,
        rarity_boost,
        final_importance,
    }
}

/// A clip with its importance score and rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedClip {
    /// The clip.
    pub clip: Clip,
    /// 1-based rank, most important first.
    pub rank: usize,
    /// Factor breakdown.
    pub factors: ClipImportanceFactors,
    /// Matches that drove the score, confidence descending.
    pub matches: Vec<ClipEventMatch>,
}

/// Ranks `clips` by importance against `events`.
#[must_use]
pub fn rank_clips(
    clips: &[Clip],
    events: &[TimelineEvent],
    context: Option<&MatchContext>,
    matcher: &MatcherConfig,
) -> Vec<RankedClip> {
    let mut ranked: Vec<RankedClip> = clips
        .iter()
        .map(|clip| {
            let matches = match_clip_to_events(clip, events, matcher);
            let factors = score_clip(&matches, context);
            RankedClip {
                clip: clip.clone(),
                rank: 0,
                factors,
                matches,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.factors
            .final_importance
            .total_cmp(&a.factors.final_importance)
    });
    for (index, clip) in ranked.iter_mut().enumerate() {
        clip.rank = index + 1;
    }
    ranked
}

/// Keeps the `n` most important clips.
#[must_use]
pub fn top_n(ranked: &[RankedClip], n: usize) -> Vec<RankedClip> {
    ranked.iter().take(n).cloned().collect()
}

/// Keeps clips at or above the importance threshold.
#[must_use]
pub fn filter_by_threshold(ranked: &[RankedClip], threshold: f64) -> Vec<RankedClip> {
    ranked
        .iter()
        .filter(|c| c.factors.final_importance >= threshold)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{MatchKind, MatcherConfig};
    use pitchcut_model::TimelineEvent;

    fn m(boost: f64, confidence: f64) -> ClipEventMatch {
        ClipEventMatch {
            clip_id: "c1".to_string(),
            event_id: "e1".to_string(),
            match_type: MatchKind::Exact,
            confidence,
            temporal_offset: 0.0,
            importance_boost: boost,
        }
    }

    #[test]
    fn base_weights_are_ordered_by_significance() {
        assert!(base_weight(TimelineEventKind::Goal) > base_weight(TimelineEventKind::Shot));
        assert!(base_weight(TimelineEventKind::Shot) > base_weight(TimelineEventKind::Pass));
        assert!(base_weight(TimelineEventKind::Pass) > base_weight(TimelineEventKind::Carry));
    }

    #[test]
    fn converted_shot_scores_as_goal() {
        let details = EventDetails {
            shot_result: Some(ShotResult::Goal),
            ..EventDetails::default()
        };
        let boost = event_importance_boost(TimelineEventKind::Shot, Some(&details));
        assert!((boost - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shot_modifiers_compound_and_clamp() {
        let details = EventDetails {
            is_on_target: Some(true),
            shot_type: Some(ShotKind::LongRange),
            ..EventDetails::default()
        };
        // 0.7 * 1.2 * 1.1 = 0.924
        let boost = event_importance_boost(TimelineEventKind::Shot, Some(&details));
        assert!((boost - 0.924).abs() < 1e-9);

        let converted = EventDetails {
            shot_result: Some(ShotResult::Goal),
            is_on_target: Some(true),
            ..EventDetails::default()
        };
        let boost = event_importance_boost(TimelineEventKind::Shot, Some(&converted));
        assert!((boost - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn won_tackle_and_interception_modifiers() {
        let tackle = EventDetails {
            won_tackle: Some(true),
            ..EventDetails::default()
        };
        assert!(
            (event_importance_boost(TimelineEventKind::Tackle, Some(&tackle)) - 0.65).abs() < 1e-9
        );

        let interception = EventDetails {
            turnover_type: Some(TurnoverKind::Interception),
            ..EventDetails::default()
        };
        assert!(
            (event_importance_boost(TimelineEventKind::Turnover, Some(&interception)) - 0.54)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn unmatched_clip_scores_at_floor() {
        let factors = score_clip(&[], None);
        assert!((factors.base_importance - 0.1).abs() < f64::EPSILON);
        assert!((factors.final_importance - 0.1).abs() < f64::EPSILON);
        assert!((factors.event_type_boost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn secondary_matches_decay() {
        let matches = vec![m(1.0, 1.0), m(0.7, 1.0), m(0.6, 1.0), m(0.5, 1.0)];
        let factors = score_clip(&matches, None);

        assert!((factors.base_importance - 1.0).abs() < f64::EPSILON);
        // 0.3 * (0.7 * 0.5 + 0.6 * 0.25); the fourth match is ignored.
        assert!((factors.event_type_boost - 0.3 * (0.35 + 0.15)).abs() < 1e-9);
        assert!((factors.final_importance - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn context_boost_caps_at_point_three() {
        let ctx = MatchContext {
            match_minute: 93.0,
            total_match_minutes: 94.0,
            score_differential: -1,
        };
        let matches = vec![m(1.0, 0.9)];
        let factors = score_clip(&matches, Some(&ctx));

        // late (~0.14) + close (0.1) + comeback goal (0.15) > 0.3 cap.
        assert!((factors.context_boost - 0.3).abs() < 1e-9);
    }

    #[test]
    fn rarity_back_inference_uses_thresholds() {
        // Boost 0.96 infers a goal: rarity 0.7.
        let factors = score_clip(&[m(0.96, 1.0)], None);
        assert!((factors.rarity_boost - 0.7 * 0.2).abs() < 1e-9);

        // Boost 0.92 infers a penalty: rarity 0.8.
        let factors = score_clip(&[m(0.92, 1.0)], None);
        assert!((factors.rarity_boost - 0.8 * 0.2).abs() < 1e-9);

        // Boost 0.65 infers a key pass: no rarity entry.
        let factors = score_clip(&[m(0.65, 1.0)], None);
        assert!((factors.rarity_boost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn final_importance_is_clamped() {
        let ctx = MatchContext {
            match_minute: 93.0,
            total_match_minutes: 94.0,
            score_differential: -1,
        };
        let matches = vec![m(1.0, 1.0), m(1.0, 1.0), m(1.0, 1.0)];
        let factors = score_clip(&matches, Some(&ctx));
        assert!((factors.final_importance - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ranking_sorts_and_numbers_clips() {
        let events = vec![
            TimelineEvent::new("goal", 100.0, TimelineEventKind::Goal),
            TimelineEvent::new("pass", 300.0, TimelineEventKind::Pass),
        ];
        let clips = vec![
            Clip::new("quiet", 295.0, 305.0),
            Clip::new("big", 95.0, 105.0),
            Clip::new("empty", 500.0, 510.0),
        ];

        let ranked = rank_clips(&clips, &events, None, &MatcherConfig::default());

        assert_eq!(ranked[0].clip.id, "big");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].clip.id, "quiet");
        assert_eq!(ranked[2].clip.id, "empty");
        assert_eq!(ranked[2].rank, 3);

        for clip in &ranked {
            assert!(clip.factors.final_importance >= 0.0);
            assert!(clip.factors.final_importance <= 1.0);
        }

        let top = top_n(&ranked, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].clip.id, "big");

        let threshold = ranked[1].factors.final_importance;
        let kept = filter_by_threshold(&ranked, threshold);
        assert_eq!(kept.len(), 2);
    }
}
