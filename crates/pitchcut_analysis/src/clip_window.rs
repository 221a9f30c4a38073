//! Dynamic clip-window calculation.
//!
//! Derives the `{before, after}` seconds to include around an event when
//! cutting a highlight clip. Per-kind base windows are modulated by the
//! event's details, match context, surrounding event density and
//! adjacent-event evidence, in a fixed order so the multiplicative
//! adjustments compound deterministically.
//!
//! The `reason` strings are the Japanese phrases shown in the operator
//! review UI.

use pitchcut_model::{
    MatchContext, SetPieceKind, ShotKind, TimelineEvent, TimelineEventKind, TurnoverKind,
};
use serde::{Deserialize, Serialize};

/// A derived clip window around one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicWindow {
    /// Seconds of footage to include before the event.
    pub before: f64,
    /// Seconds of footage to include after the event.
    pub after: f64,
    /// Operator-facing explanation of the chosen window.
    pub reason: String,
    /// Ids of expected build-up events inside the window.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_before: Vec<String>,
    /// Ids of expected follow-up events inside the window.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_after: Vec<String>,
}

/// Peers closer than this ahead of a goal mark it as a counter-attack.
const COUNTER_ATTACK_LOOKBACK_SEC: f64 = 10.0;

/// Surrounding-event count that marks a dense passage of play.
const DENSITY_THRESHOLD: usize = 3;

fn base_window(kind: TimelineEventKind) -> (f64, f64, &'static str) {
    match kind {
        TimelineEventKind::Goal => (10.0, 5.0, "ゴール前後の流れを収録"),
        TimelineEventKind::Penalty => (5.0, 5.0, "PKの助走と結果"),
        TimelineEventKind::RedCard => (7.0, 4.0, "レッドカードの反則と判定"),
        TimelineEventKind::OwnGoal => (8.0, 5.0, "オウンゴールの経緯"),
        TimelineEventKind::Shot => (7.0, 3.0, "シュートの組み立てと結果"),
        TimelineEventKind::Save => (5.0, 2.0, "セーブの場面"),
        TimelineEventKind::Chance => (6.0, 3.0, "決定機の流れ"),
        TimelineEventKind::KeyPass => (5.0, 4.0, "キーパスとその展開"),
        TimelineEventKind::Foul => (3.0, 2.0, "ファウルの瞬間"),
        TimelineEventKind::YellowCard => (4.0, 2.0, "イエローカードの反則"),
        TimelineEventKind::SetPiece => (3.0, 5.0, "セットプレーの助走と展開"),
        TimelineEventKind::Tackle => (2.0, 2.0, "タックルの攻防"),
        TimelineEventKind::Turnover => (2.0, 3.0, "ボール奪取と切り替え"),
        TimelineEventKind::Pass => (2.0, 1.0, "パスの前後"),
        TimelineEventKind::Carry => (2.0, 2.0, "ドリブルの区間"),
        TimelineEventKind::Other => (5.0, 3.0, "イベント前後"),
    }
}

/// Kinds expected in the build-up to `kind`.
fn expected_before(kind: TimelineEventKind) -> &'static [TimelineEventKind] {
    match kind {
        TimelineEventKind::Goal => &[
            TimelineEventKind::KeyPass,
            TimelineEventKind::Chance,
            TimelineEventKind::Pass,
        ],
        TimelineEventKind::Penalty => &[TimelineEventKind::Foul],
        TimelineEventKind::Shot => &[
            TimelineEventKind::KeyPass,
            TimelineEventKind::Pass,
            TimelineEventKind::Carry,
        ],
        TimelineEventKind::Save => &[TimelineEventKind::Shot],
        TimelineEventKind::Chance => &[TimelineEventKind::KeyPass, TimelineEventKind::Pass],
        _ => &[],
    }
}

/// Kinds expected in the follow-up to `kind`.
fn expected_after(kind: TimelineEventKind) -> &'static [TimelineEventKind] {
    match kind {
        TimelineEventKind::SetPiece => &[
            TimelineEventKind::Shot,
            TimelineEventKind::Goal,
            TimelineEventKind::Turnover,
        ],
        TimelineEventKind::KeyPass => &[TimelineEventKind::Shot, TimelineEventKind::Goal],
        TimelineEventKind::Turnover => &[TimelineEventKind::Carry, TimelineEventKind::Pass],
        _ => &[],
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Computes the dynamic clip window for `event` among `peers`.
///
/// `peers` is the surrounding timeline (the event itself is ignored by
/// id). `context` carries match minute and score state; without it the
/// late-game and close-score boosts do not apply.
#[must_use]
pub fn dynamic_window(
    event: &TimelineEvent,
    peers: &[TimelineEvent],
    context: Option<&MatchContext>,
) -> DynamicWindow {
    let (mut before, mut after, base_reason) = base_window(event.kind);
    let mut reason = base_reason.to_string();

    let others: Vec<&TimelineEvent> = peers.iter().filter(|p| p.id != event.id).collect();
    let details = event.details.as_ref();

    // 1. Counter-attack goal: widen to capture the winning of the ball.
    if event.kind == TimelineEventKind::Goal {
        let countered = others.iter().any(|p| {
            p.kind == TimelineEventKind::Turnover && {
                let gap = event.timestamp - p.timestamp;
                gap > 0.0 && gap <= COUNTER_ATTACK_LOOKBACK_SEC
            }
        });
        if countered {
            before = 15.0;
            reason = "カウンター攻撃の起点からゴールまで".to_string();
        }
    }

    // 2. Shot details.
    if event.kind == TimelineEventKind::Shot {
        if details.and_then(|d| d.is_on_target) == Some(true) {
            after = 4.0;
        }
        if details.and_then(|d| d.shot_type) == Some(ShotKind::LongRange) {
            before = 4.0;
        }
    }

    // 3. Set-piece kind.
    if event.kind == TimelineEventKind::SetPiece {
        match details.and_then(|d| d.set_piece_type) {
            Some(SetPieceKind::Corner) => {
                before = 2.0;
                after = 7.0;
            }
            Some(SetPieceKind::FreeKick) => {
                before = 3.0;
                after = 6.0;
            }
            _ => {}
        }
    }

    // 4. Interceptions lead somewhere: keep the break alive.
    if event.kind == TimelineEventKind::Turnover
        && details.and_then(|d| d.turnover_type) == Some(TurnoverKind::Interception)
    {
        after = 5.0;
    }

    // 5. Late-game boost for decisive kinds.
    if let Some(ctx) = context {
        let late = ctx.total_match_minutes > 0.0
            && ctx.match_minute / ctx.total_match_minutes > 0.85;
        if late
            && matches!(
                event.kind,
                TimelineEventKind::Goal | TimelineEventKind::Shot | TimelineEventKind::Chance
            )
        {
            before *= 1.2;
            after *= 1.3;
        }

        // 6. Close-score boost for goals.
        if event.kind == TimelineEventKind::Goal && ctx.score_differential.abs() <= 1 {
            before *= 1.1;
            after *= 1.2;
        }
    }

    // 7. Density boosts: a busy passage deserves a wider cut.
    let d_before = others
        .iter()
        .filter(|p| p.timestamp >= event.timestamp - before && p.timestamp <= event.timestamp)
        .count();
    if d_before > DENSITY_THRESHOLD {
        before *= 1.3;
    }
    let d_after = others
        .iter()
        .filter(|p| p.timestamp >= event.timestamp && p.timestamp <= event.timestamp + after)
        .count();
    if d_after > DENSITY_THRESHOLD {
        after *= 1.3;
    }

    before = round1(before.max(0.0));
    after = round1(after.max(0.0));

    let (context_before, context_after) = context_peers(event, &others, before, after);

    DynamicWindow {
        before,
        after,
        reason,
        context_before,
        context_after,
    }
}

/// Collects the ids of expected build-up and follow-up peers inside the
/// final window.
fn context_peers(
    event: &TimelineEvent,
    others: &[&TimelineEvent],
    before: f64,
    after: f64,
) -> (Vec<String>, Vec<String>) {
    let context_before = others
        .iter()
        .filter(|p| {
            p.timestamp < event.timestamp
                && p.timestamp >= event.timestamp - before
                && expected_before(event.kind).contains(&p.kind)
        })
        .map(|p| p.id.clone())
        .collect();
    let context_after = others
        .iter()
        .filter(|p| {
            p.timestamp > event.timestamp
                && p.timestamp <= event.timestamp + after
                && expected_after(event.kind).contains(&p.kind)
        })
        .map(|p| p.id.clone())
        .collect();

    (context_before, context_after)
}
