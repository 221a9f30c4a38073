//! Event deduplication across window overlaps.
//!
//! Overlapping analysis windows see the same physical occurrence twice;
//! this module collapses temporally adjacent same-kind, same-team raw
//! events into one representative event with merged evidence and a
//! boosted confidence.
//!
//! Clustering compares each event against the *last* event appended to
//! the open cluster, so chains inside the threshold merge transitively
//! even when the cluster ends further from its seed than the threshold.

use pitchcut_model::{DeduplicatedEvent, EventKind, RawEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Configuration for deduplication.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Maximum gap in seconds between an event and the last cluster
    /// member for it to join the cluster.
    pub time_threshold: f64,
    /// Relative confidence boost per extra detection of the same
    /// occurrence.
    pub confidence_boost_per_detection: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            time_threshold: 2.0,
            confidence_boost_per_detection: 0.1,
        }
    }
}

/// Per-kind deduplication counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindStats {
    /// Raw events of this kind.
    pub raw: usize,
    /// Deduplicated events of this kind.
    pub deduplicated: usize,
    /// Clusters of this kind that merged more than one detection.
    pub merged_count: usize,
}

/// Diagnostics for a deduplication run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupStats {
    /// Raw events fed in.
    pub total_raw_events: usize,
    /// Representative events produced.
    pub total_deduplicated_events: usize,
    /// Clusters that merged more than one detection.
    pub merged_count: usize,
    /// Singleton clusters passed through unchanged.
    pub unique_count: usize,
    /// Mean raw events per representative.
    pub average_cluster_size: f64,
    /// Counters broken down by event kind (wire names).
    pub by_type: BTreeMap<String, KindStats>,
}

/// Deduplicates raw events, returning only the representatives.
#[must_use]
pub fn deduplicate(events: &[RawEvent], config: &DedupConfig) -> Vec<DeduplicatedEvent> {
    deduplicate_with_stats(events, config).0
}

/// Deduplicates raw events and reports run diagnostics.
#[must_use]
pub fn deduplicate_with_stats(
    events: &[RawEvent],
    config: &DedupConfig,
) -> (Vec<DeduplicatedEvent>, DedupStats) {
    if events.is_empty() {
        return (Vec::new(), DedupStats::default());
    }

    // Sort by absolute time; input arrival order carries no meaning.
    // Original slice positions are kept so merged window ids can be
    // reported in input order.
    let mut ordered: Vec<(usize, &RawEvent)> = events.iter().enumerate().collect();
    ordered.sort_by(|a, b| a.1.absolute_timestamp.total_cmp(&b.1.absolute_timestamp));

    let mut clusters: Vec<Vec<(usize, &RawEvent)>> = Vec::new();
    for (index, event) in ordered {
        match clusters.last_mut() {
            Some(cluster) if joins_cluster(event, cluster, config) => {
                cluster.push((index, event));
            }
            _ => clusters.push(vec![(index, event)]),
        }
    }

    let mut stats = DedupStats {
        total_raw_events: events.len(),
        total_deduplicated_events: clusters.len(),
        ..DedupStats::default()
    };

    let mut deduplicated = Vec::with_capacity(clusters.len());
    for cluster in &clusters {
        let kind = cluster[0].1.kind;
        let entry = stats.by_type.entry(kind_name(kind)).or_default();
        entry.raw += cluster.len();
        entry.deduplicated += 1;

        if cluster.len() == 1 {
            stats.unique_count += 1;
        } else {
            stats.merged_count += 1;
            entry.merged_count += 1;
        }

        deduplicated.push(merge_cluster(cluster, config));
    }

    #[allow(clippy::cast_precision_loss)]
    {
        stats.average_cluster_size = events.len() as f64 / clusters.len() as f64;
    }

    debug!(
        "deduplicated {} raw events into {} ({} merged clusters)",
        stats.total_raw_events, stats.total_deduplicated_events, stats.merged_count
    );

    (deduplicated, stats)
}

fn kind_name(kind: EventKind) -> String {
    kind.as_str().to_string()
}

/// Whether `event` belongs in the open cluster, judged against the
/// cluster's last member (not its seed).
fn joins_cluster(event: &RawEvent, cluster: &[(usize, &RawEvent)], config: &DedupConfig) -> bool {
    cluster.last().is_some_and(|(_, last)| {
        (event.absolute_timestamp - last.absolute_timestamp).abs() <= config.time_threshold
            && event.kind == last.kind
            && event.team == last.team
    })
}

/// Merges one cluster into its representative event.
fn merge_cluster(cluster: &[(usize, &RawEvent)], config: &DedupConfig) -> DeduplicatedEvent {
    if let [(_, only)] = cluster {
        return DeduplicatedEvent {
            absolute_timestamp: only.absolute_timestamp,
            kind: only.kind,
            team: only.team,
            player: only.player.clone(),
            zone: only.zone,
            details: only.details.clone(),
            confidence: only.confidence,
            adjusted_confidence: only.confidence,
            visual_evidence: only.visual_evidence.clone(),
            merged_from_windows: vec![only.window_id.clone()],
        };
    }

    // Base event: highest confidence, earliest timestamp on ties.
    let (_, base) = cluster
        .iter()
        .min_by(|(_, a), (_, b)| {
            b.confidence
                .total_cmp(&a.confidence)
                .then(a.absolute_timestamp.total_cmp(&b.absolute_timestamp))
        })
        .expect("cluster is non-empty");

    let weight_sum: f64 = cluster.iter().map(|(_, e)| e.confidence).sum();
    let weighted_timestamp: f64 = cluster
        .iter()
        .map(|(_, e)| e.absolute_timestamp * e.confidence)
        .sum::<f64>()
        / weight_sum;

    // Details: first non-null value per key wins, most confident first.
    let mut by_confidence: Vec<&RawEvent> = cluster.iter().map(|(_, e)| *e).collect();
    by_confidence.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut details = pitchcut_model::EventDetails::default();
    for event in &by_confidence {
        details.fill_from(&event.details);
    }

    // Window ids and evidence in input (pre-sort) order.
    let mut by_input: Vec<(usize, &RawEvent)> = cluster.to_vec();
    by_input.sort_by_key(|(index, _)| *index);

    let merged_from_windows: Vec<String> = by_input
        .iter()
        .map(|(_, e)| e.window_id.clone())
        .collect();

    let evidence: Vec<&str> = by_input
        .iter()
        .filter_map(|(_, e)| e.visual_evidence.as_deref())
        .filter(|s| !s.is_empty())
        .collect();
    let visual_evidence = if evidence.is_empty() {
        None
    } else {
        Some(evidence.join("; "))
    };

    #[allow(clippy::cast_precision_loss)]
    let extra_detections = (cluster.len() - 1) as f64;
    let adjusted_confidence = (base.confidence
        * (1.0 + config.confidence_boost_per_detection * extra_detections))
        .clamp(0.0, 1.0);

    DeduplicatedEvent {
        absolute_timestamp: weighted_timestamp,
        kind: base.kind,
        team: base.team,
        player: base.player.clone(),
        zone: base.zone,
        details,
        confidence: base.confidence,
        adjusted_confidence,
        visual_evidence,
        merged_from_windows,
    }
}

/// Re-runs deduplication over representatives, treating each as a
/// single-window raw event. Deduplication is idempotent, so this is a
/// no-op on well-formed input; callers use it to re-check timelines
/// assembled from multiple sources.
#[must_use]
pub fn rededuplicate(
    events: &[DeduplicatedEvent],
    config: &DedupConfig,
) -> Vec<DeduplicatedEvent> {
    let as_raw: Vec<RawEvent> = events
        .iter()
        .map(|e| RawEvent {
            window_id: e
                .merged_from_windows
                .first()
                .cloned()
                .unwrap_or_default(),
            relative_timestamp: e.absolute_timestamp,
            absolute_timestamp: e.absolute_timestamp,
            kind: e.kind,
            team: e.team,
            player: e.player.clone(),
            zone: e.zone,
            details: e.details.clone(),
            confidence: e.adjusted_confidence,
            visual_evidence: e.visual_evidence.clone(),
        })
        .collect();

    deduplicate(&as_raw, config)
}
