//! Per-half statistic records for the half merger.

use serde::{Deserialize, Serialize};

/// A single statistic value produced by one calculator for one half.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    /// Unique identifier of this stat document.
    pub stat_id: String,
    /// Calculator that produced the value (e.g. `pass_count`,
    /// `possession_rate`).
    pub calculator_id: String,
    /// Player scope, absent for match-level stats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    /// Team scope, absent for neutral stats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// The numeric value.
    pub value: f64,
    /// Set once this stat has passed through the half merger.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub merged_from_halves: bool,
    /// Per-half provenance recorded by the merger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MergedStatMetadata>,
}

/// Provenance of a merged stat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedStatMetadata {
    /// Value contributed by the first half.
    pub first_half_value: f64,
    /// Value contributed by the second half.
    pub second_half_value: f64,
}

impl Stat {
    /// Creates a stat with the given calculator and value.
    #[must_use]
    pub fn new(stat_id: impl Into<String>, calculator_id: impl Into<String>, value: f64) -> Self {
        Self {
            stat_id: stat_id.into(),
            calculator_id: calculator_id.into(),
            player_id: None,
            team_id: None,
            value,
            merged_from_halves: false,
            metadata: None,
        }
    }

    /// Scopes the stat to a player.
    #[must_use]
    pub fn with_player(mut self, player_id: impl Into<String>) -> Self {
        self.player_id = Some(player_id.into());
        self
    }

    /// Scopes the stat to a team.
    #[must_use]
    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    /// Grouping key used by the half merger: calculator plus scope, with
    /// match-level and neutral placeholders for absent scopes.
    #[must_use]
    pub fn merge_key(&self) -> (String, String, String) {
        (
            self.calculator_id.clone(),
            self.player_id.clone().unwrap_or_else(|| "match".to_string()),
            self.team_id.clone().unwrap_or_else(|| "none".to_string()),
        )
    }
}
