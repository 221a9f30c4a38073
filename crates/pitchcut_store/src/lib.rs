//! Document-store persistence for Pitchcut pipeline outputs.
//!
//! This crate provides:
//! - The [`DocumentStore`] seam over the external key/value store
//! - Batched writing that respects the backend's 450-operation limit
//! - An in-memory store for tests and dry runs
//! - The mapping from analysis outputs to persisted collections

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]

pub mod error;
pub mod persist;
pub mod store;

pub use error::{Error, Result};
pub use persist::{persist_match_analysis, PersistSummary};
pub use store::{
    BatchWriter, Collection, Document, DocumentStore, MemoryStore, WriteOp, MAX_BATCH_OPS,
};
