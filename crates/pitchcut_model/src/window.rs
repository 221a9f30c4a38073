//! Analysis window data model.
//!
//! Windows are the sub-intervals of a segment handed to the external
//! analyzer. Adjacent windows inside a segment overlap so that events
//! near window edges are seen by two calls; the deduplicator collapses
//! the resulting duplicates.

use crate::segment::{SegmentKind, Team};
use serde::{Deserialize, Serialize};

/// Overlap of a window with its neighbors inside the same segment, in
/// seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowOverlap {
    /// Seconds shared with the preceding window (0 for the first).
    pub before: f64,
    /// Seconds shared with the following window (0 for the last).
    pub after: f64,
}

impl WindowOverlap {
    /// No overlap on either side.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            before: 0.0,
            after: 0.0,
        }
    }
}

/// Segment facts carried along with a window so the prompt builder can
/// describe the surrounding play to the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentContext {
    /// The segment this window was carved from.
    pub segment_id: String,
    /// Tactical classification of the segment.
    pub kind: SegmentKind,
    /// Scene-classifier description, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Side in possession, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
}

/// An analysis sub-interval within a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    /// Unique window identifier.
    pub window_id: String,
    /// Window start in seconds from video start.
    pub absolute_start: f64,
    /// Window end in seconds from video start.
    pub absolute_end: f64,
    /// Overlap with neighboring windows.
    pub overlap: WindowOverlap,
    /// Frame rate the analyzer should sample this window at.
    pub target_fps: u32,
    /// Facts about the segment this window came from.
    pub segment_context: SegmentContext,
}

impl Window {
    /// Duration of the window in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.absolute_end - self.absolute_start
    }

    /// Returns true if `t` (absolute seconds) falls inside the window.
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.absolute_start && t <= self.absolute_end
    }

    /// Lifts a window-relative timestamp to absolute video time.
    #[must_use]
    pub fn lift(&self, relative: f64) -> f64 {
        self.absolute_start + relative
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: f64, end: f64) -> Window {
        Window {
            window_id: "s1_w0".to_string(),
            absolute_start: start,
            absolute_end: end,
            overlap: WindowOverlap::none(),
            target_fps: 3,
            segment_context: SegmentContext {
                segment_id: "s1".to_string(),
                kind: SegmentKind::ActivePlay,
                description: None,
                team: None,
            },
        }
    }

    #[test]
    fn duration_and_containment() {
        let w = window(45.0, 105.0);
        assert!((w.duration() - 60.0).abs() < f64::EPSILON);
        assert!(w.contains(45.0));
        assert!(w.contains(105.0));
        assert!(!w.contains(105.1));
    }

    #[test]
    fn lift_adds_window_start() {
        let w = window(45.0, 105.0);
        assert!((w.lift(12.5) - 57.5).abs() < f64::EPSILON);
    }

    #[test]
    fn window_serializes_camel_case() {
        let w = window(0.0, 30.0);
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("\"absoluteStart\":0.0"));
        assert!(json.contains("\"windowId\":\"s1_w0\""));
        assert!(json.contains("\"targetFps\":3"));
    }
}
