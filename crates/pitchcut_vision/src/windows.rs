//! Analysis window generation.
//!
//! Carves each segment into overlapping fixed-width windows so that
//! events near a window edge are seen by two analyzer calls. The
//! deduplicator later collapses the duplicate detections.

use pitchcut_model::{Segment, SegmentContext, SegmentKind, Window, WindowOverlap};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Configuration for window generation.
#[derive(Debug, Clone)]
pub struct WindowingConfig {
    /// Window width in seconds.
    pub default_duration_sec: f64,
    /// Overlap between adjacent windows in seconds.
    pub overlap_sec: f64,
    /// Per-kind frame-rate overrides; kinds not present use the
    /// built-in defaults.
    pub fps_by_segment: HashMap<SegmentKind, u32>,
    /// Concurrent analyzer calls per batch.
    pub parallelism: usize,
    /// Whether stoppage segments are skipped entirely.
    pub skip_stoppages: bool,
    /// Hard cap on windows per segment.
    pub max_windows_per_segment: usize,
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            default_duration_sec: 60.0,
            overlap_sec: 15.0,
            fps_by_segment: HashMap::new(),
            parallelism: 5,
            skip_stoppages: true,
            max_windows_per_segment: 100,
        }
    }
}

impl WindowingConfig {
    /// Target frame rate for a segment kind, honoring overrides.
    #[must_use]
    pub fn fps_for(&self, kind: SegmentKind) -> u32 {
        self.fps_by_segment
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.target_fps())
    }

    /// Cursor advance between adjacent window starts.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.default_duration_sec - self.overlap_sec
    }
}

/// Generates the analysis windows for an ordered segment list.
#[must_use]
pub fn generate_windows(segments: &[Segment], config: &WindowingConfig) -> Vec<Window> {
    let mut windows = Vec::new();

    for segment in segments {
        if !segment.is_valid() {
            warn!(
                "skipping segment {} with invalid range [{}, {}]",
                segment.segment_id, segment.start_sec, segment.end_sec
            );
            continue;
        }
        if config.skip_stoppages && segment.kind == SegmentKind::Stoppage {
            debug!("skipping stoppage segment {}", segment.segment_id);
            continue;
        }

        windows.extend(windows_for_segment(segment, config));
    }

    debug!("generated {} windows from {} segments", windows.len(), segments.len());
    windows
}

fn windows_for_segment(segment: &Segment, config: &WindowingConfig) -> Vec<Window> {
    let context = SegmentContext {
        segment_id: segment.segment_id.clone(),
        kind: segment.kind,
        description: segment.description.clone(),
        team: segment.team,
    };
    let fps = config.fps_for(segment.kind);
    let width = config.default_duration_sec;
    let overlap = config.overlap_sec;

    // Short segment: one window covering the whole range.
    if segment.duration() <= width {
        return vec![Window {
            window_id: format!("{}_w0", segment.segment_id),
            absolute_start: segment.start_sec,
            absolute_end: segment.end_sec,
            overlap: WindowOverlap::none(),
            target_fps: fps,
            segment_context: context,
        }];
    }

    let mut windows = Vec::new();
    let mut cursor = segment.start_sec;
    let mut index = 0usize;

    while cursor < segment.end_sec {
        if index >= config.max_windows_per_segment {
            warn!(
                "segment {} hit the {}-window cap, truncating coverage at {cursor}s",
                segment.segment_id, config.max_windows_per_segment
            );
            break;
        }

        let end = (cursor + width).min(segment.end_sec);
        windows.push(Window {
            window_id: format!("{}_w{index}", segment.segment_id),
            absolute_start: cursor,
            absolute_end: end,
            overlap: WindowOverlap {
                before: if index > 0 { overlap } else { 0.0 },
                after: if end < segment.end_sec { overlap } else { 0.0 },
            },
            target_fps: fps,
            segment_context: context.clone(),
        });

        cursor += config.step();
        index += 1;
    }

    windows
}
