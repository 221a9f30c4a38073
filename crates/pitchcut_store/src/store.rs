//! Document-store abstraction and batched writing.
//!
//! The pipeline persists into a key/value document store addressed by
//! `(match, collection, document id)`. Backends accept at most
//! [`MAX_BATCH_OPS`] operations per batch write; [`BatchWriter`] splits
//! larger write sets so callers never have to think about the limit.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Mutex;
use tracing::debug;

/// Maximum operations a backend accepts in one batch write.
pub const MAX_BATCH_OPS: usize = 450;

/// Persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Collection {
    /// Possession runs.
    PossessionSegments,
    /// Deduplicated pass events.
    PassEvents,
    /// Deduplicated carry events.
    CarryEvents,
    /// Deduplicated turnover events.
    TurnoverEvents,
    /// Shots and set pieces queued for operator review.
    PendingReviews,
    /// Statistic values.
    Stats,
    /// Player-track identity mappings.
    TrackMappings,
    /// Per-track team metadata.
    TrackTeamMetas,
}

impl Collection {
    /// Store-side collection name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PossessionSegments => "possessionSegments",
            Self::PassEvents => "passEvents",
            Self::CarryEvents => "carryEvents",
            Self::TurnoverEvents => "turnoverEvents",
            Self::PendingReviews => "pendingReviews",
            Self::Stats => "stats",
            Self::TrackMappings => "trackMappings",
            Self::TrackTeamMetas => "trackTeamMetas",
        }
    }
}

/// A document to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id, unique within its collection.
    pub id: String,
    /// JSON body.
    pub body: serde_json::Value,
}

impl Document {
    /// Creates a document from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn new<T: Serialize>(id: impl Into<String>, value: &T) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            body: serde_json::to_value(value)?,
        })
    }
}

/// A single set operation inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOp {
    /// Target collection.
    pub collection: Collection,
    /// Document to set.
    pub document: Document,
}

/// A key/value document store accepting batched writes.
///
/// Implementations may assume `ops.len() <= MAX_BATCH_OPS`; callers go
/// through [`BatchWriter`], which enforces the limit.
pub trait DocumentStore: Send + Sync {
    /// Applies one batch of set operations for `match_id`.
    fn write_batch(
        &self,
        match_id: &str,
        ops: &[WriteOp],
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Splits arbitrarily large write sets into store-sized batches.
pub struct BatchWriter<S> {
    store: S,
    pending: Vec<WriteOp>,
}

impl<S: DocumentStore> BatchWriter<S> {
    /// Creates a writer over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            pending: Vec::new(),
        }
    }

    /// Queues one document for the next flush.
    pub fn queue(&mut self, collection: Collection, document: Document) {
        self.pending.push(WriteOp {
            collection,
            document,
        });
    }

    /// Number of queued operations.
    #[must_use]
    pub fn pending_ops(&self) -> usize {
        self.pending.len()
    }

    /// Writes everything queued, in batches of at most
    /// [`MAX_BATCH_OPS`], and returns the number of operations written.
    ///
    /// # Errors
    ///
    /// Returns the first backend error; earlier batches stay written.
    pub async fn flush(&mut self, match_id: &str) -> Result<usize> {
        let total = self.pending.len();
        if total == 0 {
            return Ok(0);
        }

        let batches = self.pending.len().div_ceil(MAX_BATCH_OPS);
        debug!("flushing {total} ops for match {match_id} in {batches} batches");

        for chunk in self.pending.chunks(MAX_BATCH_OPS) {
            self.store.write_batch(match_id, chunk).await?;
        }

        self.pending.clear();
        Ok(total)
    }

    /// Consumes the writer and returns the store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    documents: HashMap<String, BTreeMap<(Collection, String), serde_json::Value>>,
    batch_sizes: Vec<usize>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Number of documents stored for `match_id` in `collection`.
    #[must_use]
    pub fn count(&self, match_id: &str, collection: Collection) -> usize {
        self.locked().documents.get(match_id).map_or(0, |docs| {
            docs.keys().filter(|(c, _)| *c == collection).count()
        })
    }

    /// Fetches one document body.
    #[must_use]
    pub fn get(
        &self,
        match_id: &str,
        collection: Collection,
        id: &str,
    ) -> Option<serde_json::Value> {
        self.locked()
            .documents
            .get(match_id)?
            .get(&(collection, id.to_string()))
            .cloned()
    }

    /// Sizes of the batches received, in order.
    #[must_use]
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.locked().batch_sizes.clone()
    }
}

impl DocumentStore for MemoryStore {
    async fn write_batch(&self, match_id: &str, ops: &[WriteOp]) -> Result<()> {
        if ops.len() > MAX_BATCH_OPS {
            return Err(Error::WriteFailed {
                match_id: match_id.to_string(),
                message: format!("batch of {} exceeds the {MAX_BATCH_OPS}-op limit", ops.len()),
            });
        }

        let mut inner = self.locked();
        inner.batch_sizes.push(ops.len());
        let documents = inner.documents.entry(match_id.to_string()).or_default();
        for op in ops {
            documents.insert(
                (op.collection, op.document.id.clone()),
                op.document.body.clone(),
            );
        }
        Ok(())
    }
}
