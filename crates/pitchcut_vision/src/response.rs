//! Analyzer response handling.
//!
//! The analyzer returns one JSON document per window. Parsing is typed
//! (closed enums reject unknown values) and followed by explicit bounds
//! checks; any violation is a schema-validation failure for the attempt.

use crate::error::{Error, Result};
use pitchcut_model::{EventDetails, EventKind, RawEvent, Team, Window, Zone, MIN_RAW_CONFIDENCE};
use serde::{Deserialize, Serialize};

/// Per-window analyzer response document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowAnalysis {
    /// Optional quality metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnalysisMetadata>,
    /// Detected events with window-relative timestamps.
    #[serde(default)]
    pub events: Vec<WindowEvent>,
}

/// Quality metadata reported alongside events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// Analyzer's assessment of the footage quality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_quality: Option<String>,
    /// Issues affecting detection quality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_issues: Option<Vec<String>>,
    /// Seconds of footage actually analyzed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_duration_sec: Option<f64>,
}

/// A single detected event, window-relative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowEvent {
    /// Seconds from the start of the window.
    pub timestamp: f64,
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Acting side.
    pub team: Team,
    /// Shirt number or player label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    /// Pitch third.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
    /// Kind-specific details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<EventDetails>,
    /// Analyzer confidence in `[0.3, 1]`.
    pub confidence: f64,
    /// What the analyzer saw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_evidence: Option<String>,
}

/// Strips a markdown code fence if the analyzer wrapped its JSON in one.
#[must_use]
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let content_start = start + 7;
        if let Some(end) = trimmed[content_start..].find("```") {
            return trimmed[content_start..content_start + end].trim();
        }
    }

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip a language identifier if present.
        let body = rest.find('\n').map_or(rest, |n| &rest[n + 1..]);
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }

    trimmed
}

/// Parses analyzer text into a [`WindowAnalysis`] and validates it.
///
/// # Errors
///
/// Returns [`Error::EmptyResponse`] for blank text and
/// [`Error::SchemaValidation`] for malformed JSON, unknown enum values
/// or out-of-bounds fields.
pub fn parse_window_analysis(text: &str) -> Result<WindowAnalysis> {
    let json = extract_json(text);
    if json.is_empty() {
        return Err(Error::EmptyResponse);
    }

    let analysis: WindowAnalysis = serde_json::from_str(json)
        .map_err(|e| Error::SchemaValidation(format!("malformed response JSON: {e}")))?;

    validate(&analysis)?;
    Ok(analysis)
}

/// Validates field bounds the type system cannot express.
///
/// # Errors
///
/// Returns [`Error::SchemaValidation`] listing every violation found.
pub fn validate(analysis: &WindowAnalysis) -> Result<()> {
    let mut violations = Vec::new();

    for (i, event) in analysis.events.iter().enumerate() {
        if !event.timestamp.is_finite() || event.timestamp < 0.0 {
            violations.push(format!("events[{i}].timestamp must be >= 0"));
        }
        if !event.confidence.is_finite()
            || event.confidence < MIN_RAW_CONFIDENCE
            || event.confidence > 1.0
        {
            violations.push(format!(
                "events[{i}].confidence {} outside [{MIN_RAW_CONFIDENCE}, 1]",
                event.confidence
            ));
        }
        if event.team == Team::Unknown {
            violations.push(format!("events[{i}].team must be home or away"));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::SchemaValidation(violations.join("; ")))
    }
}

/// Lifts the window-relative events of a validated analysis to absolute
/// raw events.
#[must_use]
pub fn to_raw_events(analysis: &WindowAnalysis, window: &Window) -> Vec<RawEvent> {
    analysis
        .events
        .iter()
        .map(|event| RawEvent {
            window_id: window.window_id.clone(),
            relative_timestamp: event.timestamp,
            absolute_timestamp: window.lift(event.timestamp),
            kind: event.kind,
            team: event.team,
            player: event.player.clone(),
            zone: event.zone,
            details: event.details.clone().unwrap_or_default(),
            confidence: event.confidence,
            visual_evidence: event.visual_evidence.clone(),
        })
        .collect()
}
