//! Half merging.
//!
//! First and second halves are analyzed as independent videos; this
//! module composes them into one match. Second-half time fields shift by
//! the first-half duration, frame numbers stay video-relative, and
//! per-key statistics combine under sum-vs-average rules derived from
//! the calculator id.

use pitchcut_model::{Clip, MergedStatMetadata, PossessionSegment, Stat, TimelineEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// One half's analysis outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalfAnalysis {
    /// Timeline events.
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
    /// Candidate highlight clips.
    #[serde(default)]
    pub clips: Vec<Clip>,
    /// Possession runs.
    #[serde(default)]
    pub possession_segments: Vec<PossessionSegment>,
    /// Statistic values.
    #[serde(default)]
    pub stats: Vec<Stat>,
}

/// Tokens in a calculator id that force averaging regardless of any
/// count token. `total_possession_percentage` averages; the exclusion
/// wins.
const AVERAGE_TOKENS: &[&str] = &["accuracy", "rate", "percentage", "ratio", "average"];

/// Tokens anywhere in a calculator id that mark a countable metric.
const COUNT_TOKENS: &[&str] = &["count", "total", "number"];

/// Trailing tokens that mark a countable metric.
const COUNT_SUFFIXES: &[&str] = &[
    "goals",
    "shots",
    "passes",
    "tackles",
    "clearances",
    "blocks",
    "fouls",
    "corners",
    "offsides",
];

/// Whether values of this calculator sum across halves (as opposed to
/// averaging).
#[must_use]
pub fn is_count_metric(calculator_id: &str) -> bool {
    let tokens: Vec<&str> = calculator_id.split('_').collect();

    if tokens.iter().any(|t| AVERAGE_TOKENS.contains(t)) {
        return false;
    }

    tokens.iter().any(|t| COUNT_TOKENS.contains(t))
        || tokens.last().is_some_and(|t| COUNT_SUFFIXES.contains(t))
}

/// Merges two independently analyzed halves into one match.
///
/// `half_duration_sec` is the length of the first-half video; every
/// second-half time field shifts by it. Frame numbers are preserved
/// because they refer to the half's own video file.
#[must_use]
pub fn merge_halves(
    first: &HalfAnalysis,
    second: &HalfAnalysis,
    half_duration_sec: f64,
) -> HalfAnalysis {
    let mut events = first.events.clone();
    events.extend(second.events.iter().map(|e| {
        let mut shifted = e.clone();
        shifted.timestamp += half_duration_sec;
        shifted
    }));

    let mut clips = first.clips.clone();
    clips.extend(second.clips.iter().map(|c| {
        let mut shifted = c.clone();
        shifted.start_time += half_duration_sec;
        shifted.end_time += half_duration_sec;
        shifted
    }));

    let mut possession_segments = first.possession_segments.clone();
    possession_segments.extend(second.possession_segments.iter().map(|p| {
        let mut shifted = p.clone();
        shifted.t0 += half_duration_sec;
        shifted.t1 += half_duration_sec;
        shifted
    }));

    let stats = merge_stats(&first.stats, &second.stats);

    HalfAnalysis {
        events,
        clips,
        possession_segments,
        stats,
    }
}

/// Merges per-half stats grouped by `(calculator, player, team)`.
///
/// Groups of one pass through; groups of two combine by sum or average.
/// Any stats beyond the first two in a group are dropped (two halves is
/// all this pipeline produces).
#[must_use]
pub fn merge_stats(first: &[Stat], second: &[Stat]) -> Vec<Stat> {
    let mut order: Vec<(String, String, String)> = Vec::new();
    let mut groups: HashMap<(String, String, String), Vec<&Stat>> = HashMap::new();

    for stat in first.iter().chain(second) {
        let key = stat.merge_key();
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(stat);
    }

    let mut merged = Vec::with_capacity(order.len());
    for key in order {
        let group = &groups[&key];

        if group.len() > 2 {
            warn!(
                "stat group {:?} has {} entries, combining the first two only",
                key,
                group.len()
            );
        }

        let mut stat = group[0].clone();
        stat.merged_from_halves = true;

        if group.len() >= 2 {
            let (a, b) = (group[0].value, group[1].value);
            stat.value = if is_count_metric(&stat.calculator_id) {
                a + b
            } else {
                (a + b) / 2.0
            };
            stat.metadata = Some(MergedStatMetadata {
                first_half_value: a,
                second_half_value: b,
            });
        }

        merged.push(stat);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcut_model::{Team, TimelineEventKind};

    #[test]
    fn count_metric_classification() {
        assert!(is_count_metric("pass_count"));
        assert!(is_count_metric("total_shots"));
        assert!(is_count_metric("number_of_fouls"));
        assert!(is_count_metric("team_goals"));
        assert!(is_count_metric("corner_count"));

        assert!(!is_count_metric("possession_rate"));
        assert!(!is_count_metric("pass_accuracy"));
        assert!(!is_count_metric("average_speed"));
        // The exclusion wins over the count token.
        assert!(!is_count_metric("total_possession_percentage"));
        assert!(!is_count_metric("shot_ratio"));
    }

    #[test]
    fn count_stats_sum_and_rates_average() {
        let first = vec![
            Stat::new("a1", "pass_count", 10.0)
                .with_player("p1")
                .with_team("home"),
            Stat::new("a2", "possession_rate", 55.0).with_team("home"),
            Stat::new("a3", "total_possession_percentage", 60.0).with_team("home"),
        ];
        let second = vec![
            Stat::new("b1", "pass_count", 12.0)
                .with_player("p1")
                .with_team("home"),
            Stat::new("b2", "possession_rate", 45.0).with_team("home"),
            Stat::new("b3", "total_possession_percentage", 40.0).with_team("home"),
        ];

        let merged = merge_stats(&first, &second);
        assert_eq!(merged.len(), 3);

        let passes = &merged[0];
        assert!((passes.value - 22.0).abs() < f64::EPSILON);
        assert!(passes.merged_from_halves);
        let meta = passes.metadata.unwrap();
        assert!((meta.first_half_value - 10.0).abs() < f64::EPSILON);
        assert!((meta.second_half_value - 12.0).abs() < f64::EPSILON);

        let possession = &merged[1];
        assert!((possession.value - 50.0).abs() < f64::EPSILON);

        let percentage = &merged[2];
        assert!((percentage.value - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lone_stats_pass_through_marked() {
        let first = vec![Stat::new("a1", "save_count", 3.0).with_team("home")];
        let merged = merge_stats(&first, &[]);

        assert_eq!(merged.len(), 1);
        assert!((merged[0].value - 3.0).abs() < f64::EPSILON);
        assert!(merged[0].merged_from_halves);
        assert!(merged[0].metadata.is_none());
    }

    #[test]
    fn scopes_keep_groups_apart() {
        let first = vec![
            Stat::new("a1", "pass_count", 10.0).with_player("p1"),
            Stat::new("a2", "pass_count", 7.0).with_player("p2"),
        ];
        let second = vec![Stat::new("b1", "pass_count", 5.0).with_player("p1")];

        let merged = merge_stats(&first, &second);
        assert_eq!(merged.len(), 2);
        assert!((merged[0].value - 15.0).abs() < f64::EPSILON);
        assert!((merged[1].value - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn extra_group_members_are_dropped() {
        let first = vec![
            Stat::new("a1", "pass_count", 10.0),
            Stat::new("a2", "pass_count", 99.0),
        ];
        let second = vec![Stat::new("b1", "pass_count", 12.0)];

        let merged = merge_stats(&first, &second);
        assert_eq!(merged.len(), 1);
        // First two in encounter order: 10 + 99.
        assert!((merged[0].value - 109.0).abs() < f64::EPSILON);
    }

    #[test]
    fn second_half_times_shift_and_frames_do_not() {
        let mut event = TimelineEvent::new("e1", 30.0, TimelineEventKind::Goal)
            .with_team(Team::Home);
        event.frame = Some(900);

        let mut clip = Clip::new("c1", 25.0, 40.0);
        clip.start_frame = Some(750);
        clip.end_frame = Some(1200);

        let possession = PossessionSegment {
            id: "ps1".to_string(),
            t0: 10.0,
            t1: 50.0,
            team: Team::Home,
            start_frame: Some(300),
            end_frame: Some(1500),
        };

        let second = HalfAnalysis {
            events: vec![event],
            clips: vec![clip],
            possession_segments: vec![possession],
            stats: Vec::new(),
        };

        let merged = merge_halves(&HalfAnalysis::default(), &second, 2700.0);

        assert!((merged.events[0].timestamp - 2730.0).abs() < f64::EPSILON);
        assert_eq!(merged.events[0].frame, Some(900));

        assert!((merged.clips[0].start_time - 2725.0).abs() < f64::EPSILON);
        assert!((merged.clips[0].end_time - 2740.0).abs() < f64::EPSILON);
        assert_eq!(merged.clips[0].start_frame, Some(750));

        assert!((merged.possession_segments[0].t0 - 2710.0).abs() < f64::EPSILON);
        assert!((merged.possession_segments[0].t1 - 2750.0).abs() < f64::EPSILON);
        assert_eq!(merged.possession_segments[0].end_frame, Some(1500));
    }

    #[test]
    fn first_half_is_untouched() {
        let first = HalfAnalysis {
            events: vec![TimelineEvent::new("e1", 100.0, TimelineEventKind::Shot)],
            ..HalfAnalysis::default()
        };

        let merged = merge_halves(&first, &HalfAnalysis::default(), 2700.0);
        assert!((merged.events[0].timestamp - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_halves_merge_to_empty() {
        let merged = merge_halves(&HalfAnalysis::default(), &HalfAnalysis::default(), 2700.0);
        assert!(merged.events.is_empty());
        assert!(merged.stats.is_empty());
    }
}
