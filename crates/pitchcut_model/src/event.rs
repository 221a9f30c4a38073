//! Tactical event data model.
//!
//! Raw events are emitted by a single analyzer window call with
//! window-relative timestamps; deduplicated events are the merged,
//! match-level representatives produced after collapsing window overlaps.
//! Invalid states are unrepresentable by construction: every enum here is
//! closed, and the sparse `details` record keeps all keys optional to
//! match the analyzer's output shape.

use crate::segment::Team;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

/// Lowest confidence the analyzer is allowed to report.
pub const MIN_RAW_CONFIDENCE: f64 = 0.3;

/// The kind of tactical event the analyzer detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A deliberate played ball from one player to another.
    Pass,
    /// A player moving with the ball at their feet.
    Carry,
    /// Possession changing sides.
    Turnover,
    /// An attempt at goal.
    Shot,
    /// Corner, free kick, penalty or throw-in being taken.
    #[serde(rename = "setPiece")]
    SetPiece,
}

impl EventKind {
    /// Wire name of this event kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Carry => "carry",
            Self::Turnover => "turnover",
            Self::Shot => "shot",
            Self::SetPiece => "setPiece",
        }
    }
}

/// Pitch third where an event took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// The acting team's own defensive third.
    DefensiveThird,
    /// The middle third.
    MiddleThird,
    /// The attacking third.
    AttackingThird,
}

/// How a pass was played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    /// Short ground pass.
    Short,
    /// Medium-range pass.
    Medium,
    /// Long ball.
    Long,
    /// Through ball behind the defensive line.
    Through,
    /// Cross into the box.
    Cross,
}

/// Whether a pass reached its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcome {
    /// Reached a teammate.
    Complete,
    /// Missed everyone.
    Incomplete,
    /// Cut out by an opponent.
    Intercepted,
}

/// How a carry ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryEndReason {
    /// Released as a pass.
    Pass,
    /// Released as a shot.
    Shot,
    /// Lost to a defender.
    Dispossessed,
    /// Play stopped.
    Stopped,
}

/// How possession was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverKind {
    /// Won in a tackle.
    Tackle,
    /// Pass read and intercepted.
    Interception,
    /// Heavy touch ran away.
    BadTouch,
    /// Ball played out of bounds.
    OutOfBounds,
    /// Anything else.
    Other,
}

/// Result of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotResult {
    /// Crossed the line.
    Goal,
    /// Kept out by the keeper.
    Saved,
    /// Blocked by an outfield player.
    Blocked,
    /// Off target.
    Missed,
    /// Hit the woodwork.
    Post,
}

impl ShotResult {
    /// Returns true for results that were heading on target (goal, saved
    /// or woodwork).
    #[must_use]
    pub const fn is_scoring_chance(self) -> bool {
        matches!(self, Self::Goal | Self::Saved | Self::Post)
    }
}

/// Technique of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotKind {
    /// Driven with power.
    Power,
    /// Placed into a corner.
    Placed,
    /// Headed.
    Header,
    /// Volleyed.
    Volley,
    /// Struck from distance.
    LongRange,
    /// Chipped over the keeper.
    Chip,
}

/// Kind of set piece being taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetPieceKind {
    /// Corner kick.
    Corner,
    /// Free kick.
    FreeKick,
    /// Penalty kick.
    Penalty,
    /// Throw-in.
    ThrowIn,
}

/// Sparse per-event detail record.
///
/// Every key is optional; the analyzer only fills the fields relevant to
/// the event kind, and merging during deduplication unions records
/// key-by-key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    /// How a pass was played.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_type: Option<PassKind>,
    /// Whether a pass reached its target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<PassOutcome>,
    /// Intended receiver of a pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_player: Option<String>,
    /// Distance covered, in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// How a carry ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<CarryEndReason>,
    /// How possession was lost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turnover_type: Option<TurnoverKind>,
    /// Result of a shot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_result: Option<ShotResult>,
    /// Technique of a shot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_type: Option<ShotKind>,
    /// Kind of set piece.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_piece_type: Option<SetPieceKind>,
    /// Whether a shot was on target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_on_target: Option<bool>,
    /// Whether a tackle won the ball.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub won_tackle: Option<bool>,
}

impl EventDetails {
    /// Returns true if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pass_type.is_none()
            && self.outcome.is_none()
            && self.target_player.is_none()
            && self.distance.is_none()
            && self.end_reason.is_none()
            && self.turnover_type.is_none()
            && self.shot_result.is_none()
            && self.shot_type.is_none()
            && self.set_piece_type.is_none()
            && self.is_on_target.is_none()
            && self.won_tackle.is_none()
    }

    /// Fills every unset field of `self` from `other`.
    ///
    /// Existing values are never overwritten; callers feed records in
    /// descending confidence order so the most trusted value wins.
    pub fn fill_from(&mut self, other: &Self) {
        if self.pass_type.is_none() {
            self.pass_type = other.pass_type;
        }
        if self.outcome.is_none() {
            self.outcome = other.outcome;
        }
        if self.target_player.is_none() {
            self.target_player.clone_from(&other.target_player);
        }
        if self.distance.is_none() {
            self.distance = other.distance;
        }
        if self.end_reason.is_none() {
            self.end_reason = other.end_reason;
        }
        if self.turnover_type.is_none() {
            self.turnover_type = other.turnover_type;
        }
        if self.shot_result.is_none() {
            self.shot_result = other.shot_result;
        }
        if self.shot_type.is_none() {
            self.shot_type = other.shot_type;
        }
        if self.set_piece_type.is_none() {
            self.set_piece_type = other.set_piece_type;
        }
        if self.is_on_target.is_none() {
            self.is_on_target = other.is_on_target;
        }
        if self.won_tackle.is_none() {
            self.won_tackle = other.won_tackle;
        }
    }
}

/// An event emitted by a single analyzer window call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Window this event was detected in.
    pub window_id: String,
    /// Seconds from the start of the window.
    pub relative_timestamp: f64,
    /// Seconds from the start of the video
    /// (`window.absolute_start + relative_timestamp`).
    pub absolute_timestamp: f64,
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Acting side.
    pub team: Team,
    /// Shirt number or player label when identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    /// Pitch third.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
    /// Kind-specific details.
    #[serde(default)]
    pub details: EventDetails,
    /// Analyzer confidence in `[0.3, 1]`.
    pub confidence: f64,
    /// What the analyzer saw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_evidence: Option<String>,
}

impl RawEvent {
    /// Stable fingerprint of this event, usable as a deduplication key
    /// or persisted document id.
    ///
    /// Hashes the kind, team and the timestamp quantized to 100 ms so
    /// that re-detections of the same occurrence map to the same id.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn fingerprint(&self) -> u64 {
        let bucket = (self.absolute_timestamp * 10.0).round() as i64;
        let key = format!("{}|{:?}|{bucket}", self.kind.as_str(), self.team);
        xxh64(key.as_bytes(), 0)
    }
}

/// A representative event produced by collapsing temporally adjacent
/// same-kind raw events from overlapping windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeduplicatedEvent {
    /// Seconds from the start of the video (confidence-weighted across
    /// the merged detections).
    pub absolute_timestamp: f64,
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Acting side.
    pub team: Team,
    /// Shirt number or player label when identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    /// Pitch third.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
    /// Kind-specific details, unioned across detections.
    #[serde(default)]
    pub details: EventDetails,
    /// Confidence of the base (most confident) detection.
    pub confidence: f64,
    /// Confidence after the multi-detection boost, in `[0, 1]`.
    pub adjusted_confidence: f64,
    /// Joined visual evidence from all detections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_evidence: Option<String>,
    /// Windows that detected this occurrence, in detection order.
    pub merged_from_windows: Vec<String>,
}

impl DeduplicatedEvent {
    /// Stable fingerprint, mirroring [`RawEvent::fingerprint`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn fingerprint(&self) -> u64 {
        let bucket = (self.absolute_timestamp * 10.0).round() as i64;
        let key = format!("{}|{:?}|{bucket}", self.kind.as_str(), self.team);
        xxh64(key.as_bytes(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: EventKind, t: f64) -> RawEvent {
        RawEvent {
            window_id: "s1_w0".to_string(),
            relative_timestamp: t,
            absolute_timestamp: t,
            kind,
            team: Team::Home,
            player: None,
            zone: None,
            details: EventDetails::default(),
            confidence: 0.8,
            visual_evidence: None,
        }
    }

    #[test]
    fn set_piece_serializes_with_camel_case_wire_name() {
        let json = serde_json::to_string(&EventKind::SetPiece).unwrap();
        assert_eq!(json, "\"setPiece\"");
        let back: EventKind = serde_json::from_str("\"setPiece\"").unwrap();
        assert_eq!(back, EventKind::SetPiece);
    }

    #[test]
    fn other_kinds_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&EventKind::Pass).unwrap(), "\"pass\"");
        assert_eq!(
            serde_json::to_string(&TurnoverKind::BadTouch).unwrap(),
            "\"bad_touch\""
        );
        assert_eq!(
            serde_json::to_string(&ShotKind::LongRange).unwrap(),
            "\"long_range\""
        );
    }

    #[test]
    fn details_fill_does_not_overwrite() {
        let mut a = EventDetails {
            shot_result: Some(ShotResult::Saved),
            ..EventDetails::default()
        };
        let b = EventDetails {
            shot_result: Some(ShotResult::Goal),
            shot_type: Some(ShotKind::Header),
            ..EventDetails::default()
        };

        a.fill_from(&b);
        assert_eq!(a.shot_result, Some(ShotResult::Saved));
        assert_eq!(a.shot_type, Some(ShotKind::Header));
    }

    #[test]
    fn fingerprint_stable_within_quantum() {
        let a = raw(EventKind::Shot, 10.00);
        let mut b = raw(EventKind::Shot, 10.04);
        b.window_id = "s1_w1".to_string();
        // Same 100 ms bucket, different window: same physical occurrence.
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = raw(EventKind::Shot, 10.3);
        assert_ne!(a.fingerprint(), c.fingerprint());

        let d = raw(EventKind::Pass, 10.0);
        assert_ne!(a.fingerprint(), d.fingerprint());
    }

    #[test]
    fn shot_result_scoring_chance() {
        assert!(ShotResult::Goal.is_scoring_chance());
        assert!(ShotResult::Saved.is_scoring_chance());
        assert!(ShotResult::Post.is_scoring_chance());
        assert!(!ShotResult::Missed.is_scoring_chance());
        assert!(!ShotResult::Blocked.is_scoring_chance());
    }

    #[test]
    fn raw_event_round_trips() {
        let mut ev = raw(EventKind::Turnover, 42.5);
        ev.details.turnover_type = Some(TurnoverKind::Interception);
        ev.zone = Some(Zone::MiddleThird);

        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"type\":\"turnover\""));
        assert!(json.contains("\"turnoverType\":\"interception\""));

        let back: RawEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }
}
