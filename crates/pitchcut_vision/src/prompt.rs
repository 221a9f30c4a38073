//! Prompt building for windowed event detection.

use pitchcut_model::{Team, Window};

/// The fixed instruction block shared by every window prompt.
///
/// Owned by the detector rather than module-global state so tests can
/// substitute a trimmed template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Instruction header placed before the window context.
    pub header: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

const DEFAULT_HEADER: &str = "\
You are a soccer match analyst. Watch the referenced video window and \
report every tactical event you observe: passes, carries, turnovers, \
shots and set pieces.";

/// Builds the per-window analyzer prompt.
#[derive(Default)]
pub struct PromptBuilder<'a> {
    template: Option<&'a PromptTemplate>,
    window: Option<&'a Window>,
}

impl<'a> PromptBuilder<'a> {
    /// Creates a new prompt builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instruction template.
    #[must_use]
    pub const fn with_template(mut self, template: &'a PromptTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Sets the window under analysis.
    #[must_use]
    pub const fn with_window(mut self, window: &'a Window) -> Self {
        self.window = Some(window);
        self
    }

    /// Builds the prompt string.
    #[must_use]
    pub fn build(self) -> String {
        let header = self
            .template
            .map_or(DEFAULT_HEADER, |t| t.header.as_str());

        let Some(window) = self.window else {
            return header.to_string();
        };

        let ctx = &window.segment_context;
        let team = match ctx.team {
            Some(Team::Home) => "home",
            Some(Team::Away) => "away",
            Some(Team::Unknown) | None => "unknown",
        };
        let description = ctx.description.as_deref().unwrap_or("(none)");
        let kind = ctx.kind;
        let start = window.absolute_start;
        let end = window.absolute_end;
        let fps = window.target_fps;

        format!(
            r#"{header}

## Window Context

- Segment type: {kind:?}
- Segment description: {description}
- Team in possession: {team}
- Video time range: {start:.1}s - {end:.1}s
- Sample the footage at {fps} frames per second.

## Instructions

Report each event's timestamp in seconds RELATIVE to the start of this
window (0.0 = {start:.1}s of the full video).

Respond with a single JSON object, no prose:

{{
  "metadata": {{"videoQuality": "...", "qualityIssues": [], "analyzedDurationSec": 0.0}},
  "events": [
    {{
      "timestamp": 0.0,
      "type": "pass|carry|turnover|shot|setPiece",
      "team": "home|away",
      "player": "optional shirt number",
      "zone": "defensive_third|middle_third|attacking_third",
      "details": {{
        "passType": "short|medium|long|through|cross",
        "outcome": "complete|incomplete|intercepted",
        "endReason": "pass|shot|dispossessed|stopped",
        "turnoverType": "tackle|interception|bad_touch|out_of_bounds|other",
        "shotResult": "goal|saved|blocked|missed|post",
        "shotType": "power|placed|header|volley|long_range|chip",
        "setPieceType": "corner|free_kick|penalty|throw_in"
      }},
      "confidence": 0.3,
      "visualEvidence": "what you saw"
    }}
  ]
}}

Only include detail keys relevant to the event type. Confidence must be
between 0.3 and 1.0; omit events you are less sure of than 0.3."#
        )
    }
}
