//! Match, event and clip data model for Pitchcut.
//!
//! This crate provides:
//! - Segment, window and event types shared across the pipeline
//! - The scorer-view timeline taxonomy and clip types
//! - Stable event fingerprints for deduplication keys
//! - Deterministic fixture generators for tests
//!
//! # Example
//!
//! ```rust,ignore
//! use pitchcut_model::{Segment, SegmentKind};
//!
//! let segment = Segment::new("s1", 0.0, 30.0, SegmentKind::ActivePlay);
//! assert_eq!(segment.duration(), 30.0);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]

pub mod event;
pub mod fixtures;
pub mod segment;
pub mod stat;
pub mod timeline;
pub mod window;

pub use event::{
    CarryEndReason, DeduplicatedEvent, EventDetails, EventKind, PassKind, PassOutcome, RawEvent,
    SetPieceKind, ShotKind, ShotResult, TurnoverKind, Zone, MIN_RAW_CONFIDENCE,
};
pub use segment::{Segment, SegmentKind, Team};
pub use stat::{MergedStatMetadata, Stat};
pub use timeline::{Clip, MatchContext, PossessionSegment, TimelineEvent, TimelineEventKind};
pub use window::{SegmentContext, Window, WindowOverlap};
