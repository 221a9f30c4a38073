//! Set-piece outcome analysis.
//!
//! For each set piece, scans the following events inside a bounded
//! look-ahead window and classifies what came of it. Rules are checked
//! in priority order across all candidates, so a goal six seconds after
//! the corner beats a same-team turnover two seconds after it.

use pitchcut_model::{ShotResult, Team, TimelineEvent, TimelineEventKind};
use serde::{Deserialize, Serialize};

/// Default look-ahead from the set piece, in seconds.
pub const DEFAULT_OUTCOME_WINDOW_SEC: f64 = 10.0;

/// Sub-window for classifying an opponent touch as a clearance.
const CLEARANCE_WINDOW_SEC: f64 = 5.0;

/// What a set piece led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The set piece produced a goal.
    Goal,
    /// The set piece produced a shot.
    Shot,
    /// The defending side cleared the ball.
    Cleared,
    /// The attacking side gave the ball away.
    Turnover,
    /// The attacking side kept the ball without shooting.
    ContinuedPlay,
    /// Nothing observable followed within the window.
    Unknown,
}

/// The first meaningful event following a set piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPieceOutcome {
    /// Outcome classification.
    pub result_type: OutcomeKind,
    /// Seconds between the set piece and the outcome event (0 when
    /// unknown).
    pub time_to_outcome: f64,
    /// Whether the sequence produced a realistic chance of scoring.
    pub scoring_chance: bool,
    /// Id of the outcome event, when one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_event_id: Option<String>,
}

impl SetPieceOutcome {
    const fn unknown() -> Self {
        Self {
            result_type: OutcomeKind::Unknown,
            time_to_outcome: 0.0,
            scoring_chance: false,
            outcome_event_id: None,
        }
    }
}

/// Analyzes the outcome of each set piece in `set_pieces` against the
/// full ordered event list. Returns one outcome per set piece, in input
/// order.
#[must_use]
pub fn analyze_set_piece_outcomes(
    set_pieces: &[TimelineEvent],
    all_events: &[TimelineEvent],
    window_sec: f64,
) -> Vec<SetPieceOutcome> {
    set_pieces
        .iter()
        .map(|sp| outcome_for(sp, all_events, window_sec))
        .collect()
}

fn outcome_for(
    set_piece: &TimelineEvent,
    all_events: &[TimelineEvent],
    window_sec: f64,
) -> SetPieceOutcome {
    let start = set_piece.timestamp;
    let team = set_piece.team.unwrap_or(Team::Unknown);

    let mut candidates: Vec<&TimelineEvent> = all_events
        .iter()
        .filter(|e| e.id != set_piece.id && e.timestamp > start && e.timestamp - start <= window_sec)
        .collect();
    candidates.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    fn shot_result(e: &TimelineEvent) -> Option<ShotResult> {
        e.details.as_ref().and_then(|d| d.shot_result)
    }

    // Rule 1: a goal, either as a timeline goal event or a converted
    // shot.
    if let Some(goal) = candidates.iter().find(|e| {
        e.kind == TimelineEventKind::Goal
            || (e.kind == TimelineEventKind::Shot && shot_result(e) == Some(ShotResult::Goal))
    }) {
        return SetPieceOutcome {
            result_type: OutcomeKind::Goal,
            time_to_outcome: goal.timestamp - start,
            scoring_chance: true,
            outcome_event_id: Some(goal.id.clone()),
        };
    }

    // Rule 2: an on-target shot kept out (saved or off the woodwork).
    if let Some(shot) = candidates.iter().find(|e| {
        e.kind == TimelineEventKind::Shot
            && matches!(shot_result(e), Some(r) if r != ShotResult::Goal && r.is_scoring_chance())
    }) {
        return SetPieceOutcome {
            result_type: OutcomeKind::Shot,
            time_to_outcome: shot.timestamp - start,
            scoring_chance: true,
            outcome_event_id: Some(shot.id.clone()),
        };
    }

    // Rule 3: an off-target or blocked shot.
    if let Some(shot) = candidates.iter().find(|e| {
        e.kind == TimelineEventKind::Shot
            && matches!(shot_result(e), Some(r) if !r.is_scoring_chance())
    }) {
        return SetPieceOutcome {
            result_type: OutcomeKind::Shot,
            time_to_outcome: shot.timestamp - start,
            scoring_chance: false,
            outcome_event_id: Some(shot.id.clone()),
        };
    }

    // Rule 4: the taking side gave the ball away.
    if team != Team::Unknown {
        if let Some(turnover) = candidates
            .iter()
            .find(|e| e.kind == TimelineEventKind::Turnover && e.team == Some(team))
        {
            return SetPieceOutcome {
                result_type: OutcomeKind::Turnover,
                time_to_outcome: turnover.timestamp - start,
                scoring_chance: false,
                outcome_event_id: Some(turnover.id.clone()),
            };
        }

        // Rule 5: a quick opponent touch is a clearance.
        if let Some(clearance) = candidates.iter().find(|e| {
            e.team == Some(team.opponent()) && e.timestamp - start <= CLEARANCE_WINDOW_SEC
        }) {
            return SetPieceOutcome {
                result_type: OutcomeKind::Cleared,
                time_to_outcome: clearance.timestamp - start,
                scoring_chance: false,
                outcome_event_id: Some(clearance.id.clone()),
            };
        }

        // Rule 6: the taking side kept the ball without shooting.
        if let Some(kept) = candidates
            .iter()
            .find(|e| e.team == Some(team) && e.kind != TimelineEventKind::Shot)
        {
            return SetPieceOutcome {
                result_type: OutcomeKind::ContinuedPlay,
                time_to_outcome: kept.timestamp - start,
                scoring_chance: false,
                outcome_event_id: Some(kept.id.clone()),
            };
        }
    }

    SetPieceOutcome::unknown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcut_model::{EventDetails, SetPieceKind};

    fn event(id: &str, t: f64, kind: TimelineEventKind, team: Team) -> TimelineEvent {
        TimelineEvent::new(id, t, kind).with_team(team)
    }

    fn shot(id: &str, t: f64, team: Team, result: ShotResult) -> TimelineEvent {
        event(id, t, TimelineEventKind::Shot, team).with_details(EventDetails {
            shot_result: Some(result),
            ..EventDetails::default()
        })
    }

    fn corner(id: &str, t: f64, team: Team) -> TimelineEvent {
        event(id, t, TimelineEventKind::SetPiece, team).with_details(EventDetails {
            set_piece_type: Some(SetPieceKind::Corner),
            ..EventDetails::default()
        })
    }

    #[test]
    fn goal_beats_earlier_lower_priority_candidates() {
        let sp = corner("sp", 100.0, Team::Home);
        let events = vec![
            sp.clone(),
            event("to", 102.0, TimelineEventKind::Turnover, Team::Home),
            shot("sh", 104.0, Team::Home, ShotResult::Saved),
            event("goal", 106.0, TimelineEventKind::Goal, Team::Home),
        ];

        let outcomes = analyze_set_piece_outcomes(&[sp], &events, DEFAULT_OUTCOME_WINDOW_SEC);
        assert_eq!(outcomes.len(), 1);

        let outcome = &outcomes[0];
        assert_eq!(outcome.result_type, OutcomeKind::Goal);
        assert!((outcome.time_to_outcome - 6.0).abs() < f64::EPSILON);
        assert!(outcome.scoring_chance);
        assert_eq!(outcome.outcome_event_id.as_deref(), Some("goal"));
    }

    #[test]
    fn converted_shot_counts_as_goal() {
        let sp = corner("sp", 100.0, Team::Home);
        let events = vec![sp.clone(), shot("sh", 103.0, Team::Home, ShotResult::Goal)];

        let outcome = &analyze_set_piece_outcomes(&[sp], &events, 10.0)[0];
        assert_eq!(outcome.result_type, OutcomeKind::Goal);
        assert!(outcome.scoring_chance);
    }

    #[test]
    fn saved_shot_is_a_scoring_chance() {
        let sp = corner("sp", 100.0, Team::Home);
        let events = vec![sp.clone(), shot("sh", 104.0, Team::Home, ShotResult::Saved)];

        let outcome = &analyze_set_piece_outcomes(&[sp], &events, 10.0)[0];
        assert_eq!(outcome.result_type, OutcomeKind::Shot);
        assert!(outcome.scoring_chance);
    }

    #[test]
    fn blocked_shot_is_not_a_scoring_chance() {
        let sp = corner("sp", 100.0, Team::Home);
        let events = vec![sp.clone(), shot("sh", 104.0, Team::Home, ShotResult::Blocked)];

        let outcome = &analyze_set_piece_outcomes(&[sp], &events, 10.0)[0];
        assert_eq!(outcome.result_type, OutcomeKind::Shot);
        assert!(!outcome.scoring_chance);
    }

    #[test]
    fn same_team_turnover_wins_over_clearance() {
        let sp = corner("sp", 100.0, Team::Home);
        let events = vec![
            sp.clone(),
            event("cl", 101.0, TimelineEventKind::Pass, Team::Away),
            event("to", 103.0, TimelineEventKind::Turnover, Team::Home),
        ];

        let outcome = &analyze_set_piece_outcomes(&[sp], &events, 10.0)[0];
        assert_eq!(outcome.result_type, OutcomeKind::Turnover);
        assert_eq!(outcome.outcome_event_id.as_deref(), Some("to"));
    }

    #[test]
    fn quick_opponent_touch_is_a_clearance() {
        let sp = corner("sp", 100.0, Team::Home);
        let events = vec![
            sp.clone(),
            event("cl", 103.0, TimelineEventKind::Carry, Team::Away),
        ];

        let outcome = &analyze_set_piece_outcomes(&[sp], &events, 10.0)[0];
        assert_eq!(outcome.result_type, OutcomeKind::Cleared);
        assert!((outcome.time_to_outcome - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn slow_opponent_touch_is_not_a_clearance() {
        let sp = corner("sp", 100.0, Team::Home);
        let events = vec![
            sp.clone(),
            event("late", 107.0, TimelineEventKind::Carry, Team::Away),
        ];

        let outcome = &analyze_set_piece_outcomes(&[sp], &events, 10.0)[0];
        assert_eq!(outcome.result_type, OutcomeKind::Unknown);
    }

    #[test]
    fn retained_possession_is_continued_play() {
        let sp = corner("sp", 100.0, Team::Home);
        let events = vec![
            sp.clone(),
            event("keep", 104.0, TimelineEventKind::Pass, Team::Home),
        ];

        let outcome = &analyze_set_piece_outcomes(&[sp], &events, 10.0)[0];
        assert_eq!(outcome.result_type, OutcomeKind::ContinuedPlay);
    }

    #[test]
    fn nothing_in_window_is_unknown() {
        let sp = corner("sp", 100.0, Team::Home);
        let events = vec![
            sp.clone(),
            event("far", 115.0, TimelineEventKind::Pass, Team::Home),
        ];

        let outcome = &analyze_set_piece_outcomes(&[sp], &events, 10.0)[0];
        assert_eq!(outcome.result_type, OutcomeKind::Unknown);
        assert!((outcome.time_to_outcome - 0.0).abs() < f64::EPSILON);
        assert!(outcome.outcome_event_id.is_none());
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(analyze_set_piece_outcomes(&[], &[], 10.0).is_empty());
    }
}
