//! Multimodal analyzer client and windowed detection driver for
//! Pitchcut.
//!
//! This crate provides:
//! - The analyzer HTTP client and the [`VideoAnalyzer`] seam
//! - Window generation over classified segments
//! - Per-window prompt construction and response validation
//! - Retry with exponential backoff and per-attempt timeouts
//! - The bounded-parallel windowed detection driver
//!
//! # Example
//!
//! ```rust,ignore
//! use pitchcut_vision::{AnalyzerClient, ClientConfig, WindowedDetector};
//!
//! let client = AnalyzerClient::new(ClientConfig { api_key, ..Default::default() })?;
//! let detector = WindowedDetector::new(client);
//! let summary = detector.detect_events_windowed(&request, None).await?;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]

pub mod client;
pub mod detect;
pub mod error;
pub mod prompt;
pub mod response;
pub mod retry;
pub mod windows;

pub use client::{AnalyzerClient, ClientConfig, VideoAnalyzer, VideoRef};
pub use detect::{DetectionRequest, DetectionSummary, WindowedDetector};
pub use error::{Error, Result};
pub use prompt::{PromptBuilder, PromptTemplate};
pub use response::{parse_window_analysis, to_raw_events, WindowAnalysis, WindowEvent};
pub use retry::{retry_with_backoff, RetryConfig};
pub use windows::{generate_windows, WindowingConfig};
