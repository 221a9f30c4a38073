//! Scorer-view timeline model.
//!
//! After deduplication and outcome analysis the pipeline works with a
//! wider taxonomy than the analyzer emits: goals, cards, saves and
//! chances appear alongside the raw tactical kinds. Clips are candidate
//! highlight intervals matched against this timeline.

use crate::event::EventDetails;
use crate::segment::Team;
use serde::{Deserialize, Serialize};

/// Event taxonomy used by the importance scorer and window calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    /// A goal.
    Goal,
    /// A penalty being awarded or taken.
    Penalty,
    /// A sending-off.
    RedCard,
    /// A booking.
    YellowCard,
    /// A goal scored into one's own net.
    OwnGoal,
    /// An attempt at goal.
    Shot,
    /// A pass creating a clear chance.
    KeyPass,
    /// A tackle.
    Tackle,
    /// A foul.
    Foul,
    /// A goalkeeper save.
    Save,
    /// A clear scoring chance.
    Chance,
    /// A set piece being taken.
    #[serde(rename = "setPiece")]
    SetPiece,
    /// A pass.
    Pass,
    /// A carry.
    Carry,
    /// A turnover.
    Turnover,
    /// Unrecognized kind from an upstream producer; scored and windowed
    /// with conservative defaults.
    #[serde(other)]
    Other,
}

/// An event on the match timeline as seen by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// Unique event identifier.
    pub id: String,
    /// Seconds from the start of the video.
    pub timestamp: f64,
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: TimelineEventKind,
    /// Acting side, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    /// Kind-specific details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<EventDetails>,
    /// Source video frame number, when known. Frame numbers are
    /// video-relative and survive half merging unshifted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u64>,
}

impl TimelineEvent {
    /// Creates an event with the given id, timestamp and kind.
    #[must_use]
    pub fn new(id: impl Into<String>, timestamp: f64, kind: TimelineEventKind) -> Self {
        Self {
            id: id.into(),
            timestamp,
            kind,
            team: None,
            details: None,
            frame: None,
        }
    }

    /// Sets the acting side.
    #[must_use]
    pub const fn with_team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    /// Sets the detail record.
    #[must_use]
    pub fn with_details(mut self, details: EventDetails) -> Self {
        self.details = Some(details);
        self
    }
}

/// A candidate highlight interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Unique clip identifier.
    pub id: String,
    /// Clip start in seconds from video start.
    pub start_time: f64,
    /// Clip end in seconds from video start.
    pub end_time: f64,
    /// First source frame, when known (video-relative).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<u64>,
    /// Last source frame, when known (video-relative).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_frame: Option<u64>,
}

impl Clip {
    /// Creates a clip covering `[start_time, end_time]`.
    #[must_use]
    pub fn new(id: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            id: id.into(),
            start_time,
            end_time,
            start_frame: None,
            end_frame: None,
        }
    }

    /// Duration in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Midpoint of the clip.
    #[must_use]
    pub fn center(&self) -> f64 {
        (self.start_time + self.end_time) / 2.0
    }

    /// Returns true if the interval is finite with positive duration.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.start_time.is_finite()
            && self.end_time.is_finite()
            && self.end_time > self.start_time
    }
}

/// A possession run, as produced by upstream possession tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PossessionSegment {
    /// Unique identifier.
    pub id: String,
    /// Possession start in seconds from video start.
    pub t0: f64,
    /// Possession end in seconds from video start.
    pub t1: f64,
    /// Side in possession.
    pub team: Team,
    /// First source frame, when known (video-relative).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<u64>,
    /// Last source frame, when known (video-relative).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_frame: Option<u64>,
}

/// Match-level state used to modulate importance and window sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchContext {
    /// Current match minute.
    pub match_minute: f64,
    /// Total minutes in the match (including added time).
    pub total_match_minutes: f64,
    /// Goal difference from the perspective of the team of interest
    /// (negative when trailing).
    pub score_differential: i32,
}

impl MatchContext {
    /// Fraction of the match elapsed, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total_match_minutes <= 0.0 {
            return 0.0;
        }
        (self.match_minute / self.total_match_minutes).clamp(0.0, 1.0)
    }

    /// Returns true if the score is level or within one goal.
    #[must_use]
    pub const fn is_close_score(&self) -> bool {
        self.score_differential.abs() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_geometry() {
        let clip = Clip::new("c1", 10.0, 20.0);
        assert!((clip.duration() - 10.0).abs() < f64::EPSILON);
        assert!((clip.center() - 15.0).abs() < f64::EPSILON);
        assert!(clip.is_valid());
    }

    #[test]
    fn degenerate_clips_are_invalid() {
        assert!(!Clip::new("c", 20.0, 20.0).is_valid());
        assert!(!Clip::new("c", 20.0, 10.0).is_valid());
        assert!(!Clip::new("c", f64::NAN, 10.0).is_valid());
        assert!(!Clip::new("c", 0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn unknown_kind_degrades_to_other() {
        let kind: TimelineEventKind = serde_json::from_str("\"nutmeg\"").unwrap();
        assert_eq!(kind, TimelineEventKind::Other);
    }

    #[test]
    fn set_piece_wire_name() {
        assert_eq!(
            serde_json::to_string(&TimelineEventKind::SetPiece).unwrap(),
            "\"setPiece\""
        );
        assert_eq!(
            serde_json::to_string(&TimelineEventKind::KeyPass).unwrap(),
            "\"key_pass\""
        );
    }

    #[test]
    fn match_progress_clamps() {
        let ctx = MatchContext {
            match_minute: 85.0,
            total_match_minutes: 94.0,
            score_differential: -1,
        };
        assert!(ctx.progress() > 0.85);
        assert!(ctx.is_close_score());

        let zero = MatchContext {
            match_minute: 10.0,
            total_match_minutes: 0.0,
            score_differential: 0,
        };
        assert!((zero.progress() - 0.0).abs() < f64::EPSILON);
    }
}
