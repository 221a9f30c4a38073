//! Windowed detection driver.
//!
//! Drives the analyzer over the generated windows in sequential batches
//! of `parallelism` concurrent calls. Within a batch every window is
//! awaited; one window's failure never cancels its siblings, but any
//! failure left after the retry budget fails the batch and with it the
//! detection step.

use crate::client::{VideoAnalyzer, VideoRef};
use crate::error::{Error, Result};
use crate::prompt::{PromptBuilder, PromptTemplate};
use crate::response::{parse_window_analysis, to_raw_events};
use crate::retry::{retry_with_backoff, RetryConfig};
use crate::windows::{generate_windows, WindowingConfig};
use pitchcut_model::{RawEvent, Segment, Window};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Input to a windowed detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRequest {
    /// Match being analyzed.
    pub match_id: String,
    /// Pipeline version tag recorded with the results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Ordered segment list from scene classification.
    pub segments: Vec<Segment>,
    /// Cached video reference; absent when the upload expired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoRef>,
}

/// Aggregated output of a windowed detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    /// Match that was analyzed.
    pub match_id: String,
    /// Number of windows driven.
    pub window_count: usize,
    /// Total raw events across all windows.
    pub raw_event_count: usize,
    /// Raw event counts per kind (wire names).
    pub events_by_type: BTreeMap<String, usize>,
    /// The normalized raw events.
    pub raw_events: Vec<RawEvent>,
    /// True when the run was skipped (no usable video reference).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    /// Why the run was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionSummary {
    fn empty(match_id: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            window_count: 0,
            raw_event_count: 0,
            events_by_type: BTreeMap::new(),
            raw_events: Vec::new(),
            skipped: false,
            error: None,
        }
    }

    fn skipped(match_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            skipped: true,
            error: Some(reason.into()),
            ..Self::empty(match_id)
        }
    }
}

/// Drives bounded-parallel windowed detection over a match.
pub struct WindowedDetector<A> {
    analyzer: A,
    windowing: WindowingConfig,
    retry: RetryConfig,
    template: PromptTemplate,
}

impl<A: VideoAnalyzer> WindowedDetector<A> {
    /// Creates a detector with default windowing and retry policies.
    #[must_use]
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            windowing: WindowingConfig::default(),
            retry: RetryConfig::default(),
            template: PromptTemplate::default(),
        }
    }

    /// Replaces the windowing configuration.
    #[must_use]
    pub fn with_windowing(mut self, windowing: WindowingConfig) -> Self {
        self.windowing = windowing;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the prompt template.
    #[must_use]
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Runs windowed detection for `request`.
    ///
    /// A missing video reference yields a skipped summary rather than an
    /// error so callers can persist the skip marker. An empty segment
    /// list (no upstream scene data) yields an empty summary.
    ///
    /// `deadline` cancels batches that have not started; in-flight calls
    /// are bounded by the per-attempt timeout of the retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pipeline`] when any window in a batch still
    /// fails after its retry budget, or when the deadline expires with
    /// batches left to run.
    pub async fn detect_events_windowed(
        &self,
        request: &DetectionRequest,
        deadline: Option<Instant>,
    ) -> Result<DetectionSummary> {
        let Some(video) = &request.video else {
            warn!("match {}: no cached video reference, skipping", request.match_id);
            return Ok(DetectionSummary::skipped(
                &request.match_id,
                "no cached video reference and no file URI available",
            ));
        };

        if request.segments.is_empty() {
            debug!("match {}: no segments to analyze", request.match_id);
            return Ok(DetectionSummary::empty(&request.match_id));
        }

        let windows = generate_windows(&request.segments, &self.windowing);
        let window_count = windows.len();
        info!(
            "match {}: driving {window_count} windows in batches of {}",
            request.match_id, self.windowing.parallelism
        );

        let mut raw_events = Vec::new();
        let batch_size = self.windowing.parallelism.max(1);

        for (batch_index, batch) in windows.chunks(batch_size).enumerate() {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    let remaining = window_count - batch_index * batch_size;
                    return Err(Error::Pipeline {
                        match_id: request.match_id.clone(),
                        step: "windowed_detection".to_string(),
                        message: format!(
                            "deadline exceeded with {remaining} windows not started"
                        ),
                    });
                }
            }

            debug!(
                "match {}: batch {batch_index} ({} windows)",
                request.match_id,
                batch.len()
            );

            let results =
                futures::future::join_all(batch.iter().map(|w| self.process_window(video, w)))
                    .await;

            let mut failures = Vec::new();
            for (window, result) in batch.iter().zip(results) {
                match result {
                    Ok(events) => raw_events.extend(events),
                    Err(e) => failures.push(format!("{}: {e}", window.window_id)),
                }
            }

            if !failures.is_empty() {
                return Err(Error::Pipeline {
                    match_id: request.match_id.clone(),
                    step: "windowed_detection".to_string(),
                    message: format!("batch {batch_index} failed: {}", failures.join("; ")),
                });
            }
        }

        let mut events_by_type = BTreeMap::new();
        for event in &raw_events {
            *events_by_type
                .entry(event.kind.as_str().to_string())
                .or_insert(0) += 1;
        }

        info!(
            "match {}: {} raw events from {window_count} windows",
            request.match_id,
            raw_events.len()
        );

        Ok(DetectionSummary {
            match_id: request.match_id.clone(),
            window_count,
            raw_event_count: raw_events.len(),
            events_by_type,
            raw_events,
            skipped: false,
            error: None,
        })
    }

    async fn process_window(&self, video: &VideoRef, window: &Window) -> Result<Vec<RawEvent>> {
        let prompt = PromptBuilder::new()
            .with_template(&self.template)
            .with_window(window)
            .build();

        retry_with_backoff(&self.retry, &window.window_id, || async {
            let text = self.analyzer.analyze(video, &prompt).await?;
            let analysis = parse_window_analysis(&text)?;
            Ok(to_raw_events(&analysis, window))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcut_model::SegmentKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Analyzer driven by a closure over the prompt text, tracking call
    /// concurrency.
    struct ScriptedAnalyzer<F> {
        script: F,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl<F> ScriptedAnalyzer<F>
    where
        F: Fn(&str) -> Result<String> + Send + Sync,
    {
        fn new(script: F) -> Self {
            Self {
                script,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    impl<F> VideoAnalyzer for ScriptedAnalyzer<F>
    where
        F: Fn(&str) -> Result<String> + Send + Sync,
    {
        async fn analyze(&self, _video: &VideoRef, prompt: &str) -> Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            let result = (self.script)(prompt);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            timeout_ms: 1000,
            jitter_factor: 0.0,
        }
    }

    fn request(segments: Vec<Segment>) -> DetectionRequest {
        DetectionRequest {
            match_id: "m1".to_string(),
            version: None,
            segments,
            video: Some(VideoRef::mp4("files/abc123")),
        }
    }

    const ONE_SHOT: &str = r#"{"events": [{"timestamp": 5.0, "type": "shot", "team": "home",
        "details": {"shotResult": "saved"}, "confidence": 0.8}]}"#;
    const ONE_PASS: &str = r#"{"events": [{"timestamp": 2.0, "type": "pass", "team": "away",
        "confidence": 0.6}]}"#;

    #[tokio::test]
    async fn normalizes_events_across_windows() {
        let analyzer = ScriptedAnalyzer::new(|prompt: &str| {
            if prompt.contains("0.0s - 30.0s") {
                Ok(ONE_SHOT.to_string())
            } else {
                Ok(ONE_PASS.to_string())
            }
        });
        let detector = WindowedDetector::new(analyzer).with_retry(fast_retry());

        let req = request(vec![
            Segment::new("s1", 0.0, 30.0, SegmentKind::ActivePlay),
            Segment::new("s2", 30.0, 60.0, SegmentKind::SetPiece),
        ]);
        let summary = detector.detect_events_windowed(&req, None).await.unwrap();

        assert_eq!(summary.window_count, 2);
        assert_eq!(summary.raw_event_count, 2);
        assert_eq!(summary.events_by_type.get("shot"), Some(&1));
        assert_eq!(summary.events_by_type.get("pass"), Some(&1));

        let shot = summary
            .raw_events
            .iter()
            .find(|e| e.kind == pitchcut_model::EventKind::Shot)
            .unwrap();
        assert!((shot.absolute_timestamp - 5.0).abs() < f64::EPSILON);

        let pass = summary
            .raw_events
            .iter()
            .find(|e| e.kind == pitchcut_model::EventKind::Pass)
            .unwrap();
        assert!((pass.absolute_timestamp - 32.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn missing_video_yields_skipped_summary() {
        let analyzer = ScriptedAnalyzer::new(|_: &str| Ok(ONE_PASS.to_string()));
        let detector = WindowedDetector::new(analyzer).with_retry(fast_retry());

        let mut req = request(vec![Segment::new("s1", 0.0, 30.0, SegmentKind::ActivePlay)]);
        req.video = None;

        let summary = detector.detect_events_windowed(&req, None).await.unwrap();
        assert!(summary.skipped);
        assert!(summary.error.as_deref().unwrap().contains("video"));
        assert_eq!(summary.window_count, 0);
    }

    #[tokio::test]
    async fn empty_segments_yield_empty_summary() {
        let analyzer = ScriptedAnalyzer::new(|_: &str| Ok(ONE_PASS.to_string()));
        let detector = WindowedDetector::new(analyzer).with_retry(fast_retry());

        let summary = detector
            .detect_events_windowed(&request(Vec::new()), None)
            .await
            .unwrap();
        assert!(!summary.skipped);
        assert_eq!(summary.raw_event_count, 0);
    }

    #[tokio::test]
    async fn window_failure_fails_batch_with_context() {
        let analyzer = ScriptedAnalyzer::new(|prompt: &str| {
            if prompt.contains("30.0s - 60.0s") {
                Err(Error::ApiStatus {
                    status: 500,
                    message: "internal".to_string(),
                })
            } else {
                Ok(ONE_SHOT.to_string())
            }
        });
        let detector = WindowedDetector::new(analyzer).with_retry(fast_retry());

        let req = request(vec![
            Segment::new("s1", 0.0, 30.0, SegmentKind::ActivePlay),
            Segment::new("s2", 30.0, 60.0, SegmentKind::ActivePlay),
        ]);
        let err = detector
            .detect_events_windowed(&req, None)
            .await
            .unwrap_err();

        match err {
            Error::Pipeline {
                match_id,
                step,
                message,
            } => {
                assert_eq!(match_id, "m1");
                assert_eq!(step, "windowed_detection");
                assert!(message.contains("s2_w0"));
            }
            other => panic!("expected pipeline error, got {other}"),
        }
    }

    #[tokio::test]
    async fn expired_deadline_cancels_unstarted_batches() {
        let analyzer = ScriptedAnalyzer::new(|_: &str| Ok(ONE_PASS.to_string()));
        let detector = WindowedDetector::new(analyzer).with_retry(fast_retry());

        let req = request(vec![Segment::new("s1", 0.0, 30.0, SegmentKind::ActivePlay)]);
        let past = Instant::now() - Duration::from_secs(1);

        let err = detector
            .detect_events_windowed(&req, Some(past))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("deadline"));
    }

    #[tokio::test]
    async fn concurrency_is_bounded_by_parallelism() {
        let analyzer = ScriptedAnalyzer::new(|_: &str| Ok(ONE_PASS.to_string()));
        let windowing = WindowingConfig {
            parallelism: 3,
            ..WindowingConfig::default()
        };

        // Seven 30s segments: seven windows, batches of three.
        let segments: Vec<Segment> = (0..7)
            .map(|i| {
                let start = f64::from(i) * 30.0;
                Segment::new(format!("s{i}"), start, start + 30.0, SegmentKind::ActivePlay)
            })
            .collect();

        let detector = WindowedDetector::new(analyzer)
            .with_windowing(windowing)
            .with_retry(fast_retry());

        let summary = detector
            .detect_events_windowed(&request(segments), None)
            .await
            .unwrap();
        assert_eq!(summary.window_count, 7);
        assert_eq!(summary.raw_event_count, 7);

        let max = detector.analyzer.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "at most 3 concurrent calls, saw {max}");
        assert!(max >= 2, "batch should overlap calls, saw {max}");
    }
}
