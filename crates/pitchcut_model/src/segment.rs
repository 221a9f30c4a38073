//! Match segment data model.
//!
//! Segments are the output of upstream scene classification: contiguous
//! time intervals of the match tagged with a tactical classification.
//! They are the unit the window generator carves into analysis windows.

use serde::{Deserialize, Serialize};

/// Tactical classification of a match segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Open play with the ball in motion.
    ActivePlay,
    /// Corner, free kick, penalty or throw-in preparation.
    SetPiece,
    /// The build-up and aftermath of a goal.
    GoalMoment,
    /// Ball out of play, injuries, substitutions.
    Stoppage,
    /// Broadcast replay footage (not live action).
    Replay,
}

impl SegmentKind {
    /// Target analysis frame rate for this segment kind.
    ///
    /// Denser sampling where the action is decisive, sparser where
    /// little happens.
    #[must_use]
    pub const fn target_fps(self) -> u32 {
        match self {
            Self::ActivePlay | Self::Replay => 3,
            Self::SetPiece => 2,
            Self::GoalMoment => 5,
            Self::Stoppage => 1,
        }
    }
}

/// Which side an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Home side.
    Home,
    /// Away side.
    Away,
    /// Side could not be determined.
    #[default]
    Unknown,
}

impl Team {
    /// Returns the opposing side, or `Unknown` if unknown.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
            Self::Unknown => Self::Unknown,
        }
    }
}

/// A contiguous interval of the match with a tactical classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Unique segment identifier.
    pub segment_id: String,
    /// Start of the interval in seconds from video start.
    pub start_sec: f64,
    /// End of the interval in seconds from video start.
    pub end_sec: f64,
    /// Tactical classification.
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    /// Free-form description from the scene classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Side in possession, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    /// Upstream importance hint in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
}

impl Segment {
    /// Creates a new segment.
    #[must_use]
    pub fn new(segment_id: impl Into<String>, start_sec: f64, end_sec: f64, kind: SegmentKind) -> Self {
        Self {
            segment_id: segment_id.into(),
            start_sec,
            end_sec,
            kind,
            description: None,
            team: None,
            importance: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the side in possession.
    #[must_use]
    pub const fn with_team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    /// Duration of the segment in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_sec - self.start_sec
    }

    /// Returns true if the time range is finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.start_sec.is_finite() && self.end_sec.is_finite() && self.end_sec > self.start_sec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_duration_and_validity() {
        let seg = Segment::new("s1", 10.0, 70.0, SegmentKind::ActivePlay);
        assert!((seg.duration() - 60.0).abs() < f64::EPSILON);
        assert!(seg.is_valid());

        let bad = Segment::new("s2", 70.0, 70.0, SegmentKind::Stoppage);
        assert!(!bad.is_valid());
    }

    #[test]
    fn fps_by_segment_kind() {
        assert_eq!(SegmentKind::ActivePlay.target_fps(), 3);
        assert_eq!(SegmentKind::SetPiece.target_fps(), 2);
        assert_eq!(SegmentKind::GoalMoment.target_fps(), 5);
        assert_eq!(SegmentKind::Stoppage.target_fps(), 1);
    }

    #[test]
    fn team_opponent() {
        assert_eq!(Team::Home.opponent(), Team::Away);
        assert_eq!(Team::Away.opponent(), Team::Home);
        assert_eq!(Team::Unknown.opponent(), Team::Unknown);
    }

    #[test]
    fn segment_kind_serializes_snake_case() {
        let json = serde_json::to_string(&SegmentKind::GoalMoment).unwrap();
        assert_eq!(json, "\"goal_moment\"");
    }

    #[test]
    fn segment_round_trips_through_json() {
        let seg = Segment::new("s3", 0.0, 45.0, SegmentKind::SetPiece)
            .with_team(Team::Away)
            .with_description("corner preparation");

        let json = serde_json::to_string(&seg).unwrap();
        assert!(json.contains("\"type\":\"set_piece\""));
        assert!(json.contains("\"segmentId\":\"s3\""));

        let back: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seg);
    }
}
