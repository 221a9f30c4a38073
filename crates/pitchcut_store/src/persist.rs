//! Mapping of pipeline outputs to persisted documents.
//!
//! Deduplicated events route to per-kind collections; shots and set
//! pieces additionally flow to `pendingReviews` for operator sign-off
//! before highlight assembly. Document ids come from the stable event
//! fingerprints so re-runs overwrite rather than duplicate.

use crate::error::Result;
use crate::store::{BatchWriter, Collection, Document, DocumentStore};
use pitchcut_model::{DeduplicatedEvent, EventKind, PossessionSegment, Stat};
use tracing::info;

/// Counts of documents written by [`persist_match_analysis`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    /// Event documents across the per-kind collections.
    pub events: usize,
    /// Documents queued for operator review.
    pub pending_reviews: usize,
    /// Possession-run documents.
    pub possession_segments: usize,
    /// Stat documents.
    pub stats: usize,
}

const fn collection_for(kind: EventKind) -> Collection {
    match kind {
        EventKind::Pass => Collection::PassEvents,
        EventKind::Carry => Collection::CarryEvents,
        EventKind::Turnover => Collection::TurnoverEvents,
        EventKind::Shot | EventKind::SetPiece => Collection::PendingReviews,
    }
}

/// Persists one match's analysis outputs, splitting writes at the
/// backend batch limit.
///
/// # Errors
///
/// Returns the first serialization or backend error.
pub async fn persist_match_analysis<S: DocumentStore>(
    store: S,
    match_id: &str,
    events: &[DeduplicatedEvent],
    possession_segments: &[PossessionSegment],
    stats: &[Stat],
) -> Result<(PersistSummary, S)> {
    let mut writer = BatchWriter::new(store);
    let mut summary = PersistSummary::default();

    for event in events {
        let id = format!("{:016x}", event.fingerprint());
        let collection = collection_for(event.kind);
        writer.queue(collection, Document::new(id, event)?);

        if collection == Collection::PendingReviews {
            summary.pending_reviews += 1;
        } else {
            summary.events += 1;
        }
    }

    for segment in possession_segments {
        writer.queue(
            Collection::PossessionSegments,
            Document::new(segment.id.clone(), segment)?,
        );
        summary.possession_segments += 1;
    }

    for stat in stats {
        writer.queue(Collection::Stats, Document::new(stat.stat_id.clone(), stat)?);
        summary.stats += 1;
    }

    let written = writer.flush(match_id).await?;
    info!("persisted {written} documents for match {match_id}");

    Ok((summary, writer.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pitchcut_model::{EventDetails, Team};

    fn event(kind: EventKind, t: f64) -> DeduplicatedEvent {
        DeduplicatedEvent {
            absolute_timestamp: t,
            kind,
            team: Team::Home,
            player: None,
            zone: None,
            details: EventDetails::default(),
            confidence: 0.8,
            adjusted_confidence: 0.8,
            visual_evidence: None,
            merged_from_windows: vec!["w0".to_string()],
        }
    }

    #[tokio::test]
    async fn events_route_to_their_collections() {
        let events = vec![
            event(EventKind::Pass, 10.0),
            event(EventKind::Carry, 20.0),
            event(EventKind::Turnover, 30.0),
            event(EventKind::Shot, 40.0),
            event(EventKind::SetPiece, 50.0),
        ];

        let (summary, store) =
            persist_match_analysis(MemoryStore::new(), "m1", &events, &[], &[])
                .await
                .unwrap();

        assert_eq!(summary.events, 3);
        assert_eq!(summary.pending_reviews, 2);
        assert_eq!(store.count("m1", Collection::PassEvents), 1);
        assert_eq!(store.count("m1", Collection::CarryEvents), 1);
        assert_eq!(store.count("m1", Collection::TurnoverEvents), 1);
        assert_eq!(store.count("m1", Collection::PendingReviews), 2);
    }

    #[tokio::test]
    async fn re_runs_overwrite_by_fingerprint() {
        let events = vec![event(EventKind::Pass, 10.0)];

        let (_, store) = persist_match_analysis(MemoryStore::new(), "m1", &events, &[], &[])
            .await
            .unwrap();
        let (_, store) = persist_match_analysis(store, "m1", &events, &[], &[])
            .await
            .unwrap();

        assert_eq!(store.count("m1", Collection::PassEvents), 1);
    }

    #[tokio::test]
    async fn stats_and_possession_are_persisted() {
        let stats = vec![Stat::new("st1", "pass_count", 22.0).with_team("home")];
        let possession = vec![PossessionSegment {
            id: "ps1".to_string(),
            t0: 0.0,
            t1: 30.0,
            team: Team::Home,
            start_frame: None,
            end_frame: None,
        }];

        let (summary, store) =
            persist_match_analysis(MemoryStore::new(), "m1", &[], &possession, &stats)
                .await
                .unwrap();

        assert_eq!(summary.stats, 1);
        assert_eq!(summary.possession_segments, 1);
        assert!(store.get("m1", Collection::Stats, "st1").is_some());
        assert!(store
            .get("m1", Collection::PossessionSegments, "ps1")
            .is_some());
    }

    #[tokio::test]
    async fn large_event_sets_split_into_batches() {
        let events: Vec<DeduplicatedEvent> = (0..950)
            .map(|i| event(EventKind::Pass, f64::from(i) * 5.0))
            .collect();

        let (summary, store) =
            persist_match_analysis(MemoryStore::new(), "m1", &events, &[], &[])
                .await
                .unwrap();

        assert_eq!(summary.events, 950);
        assert_eq!(store.batch_sizes(), vec![450, 450, 50]);
    }
}
