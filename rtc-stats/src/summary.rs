//! The vendor-neutral summary handed to the caller.

use crate::record::{RawRecord, StatValue};
use ::serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized metric names used as keys of [`MediaStats`].
pub mod metric {
    pub const INPUT_LEVEL: &str = "inputLevel";
    pub const PACKETS_LOST: &str = "packetsLost";
    pub const RTT: &str = "rtt";
    pub const PACKETS_SENT: &str = "packetsSent";
    pub const BYTES_SENT: &str = "bytesSent";
    pub const FRAME_HEIGHT_INPUT: &str = "frameHeightInput";
    pub const FRAME_WIDTH_INPUT: &str = "frameWidthInput";
    pub const FRAME_RATE_INPUT: &str = "frameRateInput";
    pub const FRAME_RATE_SENT: &str = "frameRateSent";
    pub const FRAME_HEIGHT_SENT: &str = "frameHeightSent";
    pub const FRAME_WIDTH_SENT: &str = "frameWidthSent";
}

/// One side of an active candidate pair.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInfo {
    pub candidate_type: Option<String>,
    pub ip_address: Option<String>,
}

/// The transport channel carried by the active candidate pair.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub id: Option<String>,
    pub local: CandidateInfo,
    pub remote: CandidateInfo,
    pub transport: Option<String>,
}

/// Normalized per-media metrics, built by repeated right-biased merges.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaStats {
    fields: BTreeMap<String, StatValue>,
}

impl MediaStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `update` into the accumulated metrics.
    ///
    /// Present values overwrite whatever is stored under the same name; names
    /// mapped to `None` leave the stored value untouched, so a merge never
    /// removes a metric.
    pub fn merge<'a, I>(&mut self, update: I)
    where
        I: IntoIterator<Item = (&'a str, Option<StatValue>)>,
    {
        for (name, value) in update {
            if let Some(value) = value {
                self.fields.insert(name.to_owned(), value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&StatValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn bytes_sent(&self) -> Option<&StatValue> {
        self.get(metric::BYTES_SENT)
    }

    /// Whether a non-empty sent-byte count has been merged.
    pub fn has_bytes_sent(&self) -> bool {
        self.bytes_sent().is_some_and(StatValue::is_truthy)
    }
}

/// Simple, vendor-neutral stats for one normalization.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// First non-zero record timestamp, in milliseconds since the Unix epoch.
    /// Zero until one is seen.
    pub timestamp: f64,
    /// Every record received so far, in host report order.
    pub results: Vec<RawRecord>,
    /// Channels of the active candidate pairs.
    pub channels: Vec<ChannelDescriptor>,
    pub audio: MediaStats,
    pub video: MediaStats,
}

impl StatsSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both summaries carry a sent-byte count.
    pub fn is_complete(&self) -> bool {
        self.audio.has_bytes_sent() && self.video.has_bytes_sent()
    }
}
