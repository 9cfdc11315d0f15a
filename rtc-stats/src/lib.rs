//! # RTC Stats - Simple WebRTC Statistics
//!
//! Hosts report WebRTC statistics in different shapes: some answer one request
//! per local track with plain records, others answer a whole-connection request
//! with a report collection, and each uses its own field names. This crate
//! reshapes either into one small [`StatsSummary`]: the active transport
//! channels plus a handful of audio and video sender metrics.
//!
//! ## Flow
//!
//! 1. [`SimpleStats::new`] detects the host's [`Capability`] once and keeps the
//!    matching [`StatsSource`].
//! 2. [`SimpleStats::normalize`] issues the stats request(s). Track-scoped hosts
//!    get one request per media kind, answered in any order.
//! 3. Every answered batch is flattened into [`RawRecord`]s and the whole
//!    record list is classified again by the [`StatsCollector`].
//! 4. The summary is returned once both audio and video carry a sent-byte
//!    count, or an [`Error`] explains why that never happened.
//!
//! ```ignore
//! use rtc_stats::{NormalizerConfigBuilder, RenderDimensions, SimpleStats};
//! use std::time::Duration;
//!
//! let config = NormalizerConfigBuilder::new()
//!     .with_timeout(Duration::from_secs(5))
//!     .build();
//! let simple_stats = SimpleStats::new(host, config)?;
//!
//! let summary = simple_stats
//!     .normalize(Some(RenderDimensions::new(640, 480)))
//!     .await?;
//! for channel in &summary.channels {
//!     println!("{:?} over {:?}", channel.id, channel.transport);
//! }
//! ```
//!
//! The crate performs no I/O of its own; requests go through the host's
//! [`StatsProvider`] implementation and diagnostics go to the `log` facade.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod normalizer;
pub mod packager;
pub mod record;
pub mod report;
pub mod source;
pub mod summary;

pub use config::{NormalizerConfig, NormalizerConfigBuilder, RenderDimensions};
pub use error::{Error, Result};
pub use normalizer::SimpleStats;
pub use packager::StatsCollector;
pub use record::{MediaKind, RawRecord, StatValue};
pub use report::{ConnectionStatsReport, ConnectionStatsResponse};
pub use source::{Capability, LocalTrack, StatsProvider, StatsSource};
pub use summary::{CandidateInfo, ChannelDescriptor, MediaStats, StatsSummary, metric};
