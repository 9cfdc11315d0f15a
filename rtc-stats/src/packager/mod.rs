//! Classification of raw records into a [`StatsSummary`].
//!
//! The collector follows an "append batch + re-package" pattern: every batch
//! the host delivers is appended to the cumulative record list, then the whole
//! list is scanned again. The scan only ever adds or overwrites summary
//! entries, so running it more than once over the same records is harmless.

use crate::config::{NormalizerConfig, RenderDimensions};
use crate::error::Error;
use crate::record::{RawRecord, StatValue};
use crate::summary::{CandidateInfo, ChannelDescriptor, StatsSummary, metric};
use log::{debug, trace};
use std::collections::HashSet;

/// Stat names reported by connection-scoped hosts.
mod connection {
    pub const CANDIDATE_PAIR_TYPE: &str = "googCandidatePair";
    pub const ACTIVE_CONNECTION: &str = "googActiveConnection";
    pub const CHANNEL_ID: &str = "googChannelId";
    pub const LOCAL_CANDIDATE_TYPE: &str = "googLocalCandidateType";
    pub const LOCAL_ADDRESS: &str = "googLocalAddress";
    pub const REMOTE_CANDIDATE_TYPE: &str = "googRemoteCandidateType";
    pub const REMOTE_ADDRESS: &str = "googRemoteAddress";
    pub const TRANSPORT_TYPE: &str = "googTransportType";
    pub const CODEC_NAME: &str = "googCodecName";
    pub const AUDIO_INPUT_LEVEL: &str = "audioInputLevel";
    pub const RTT: &str = "googRtt";
    pub const FRAME_HEIGHT_INPUT: &str = "googFrameHeightInput";
    pub const FRAME_WIDTH_INPUT: &str = "googFrameWidthInput";
    pub const FRAME_RATE_INPUT: &str = "googFrameRateInput";
    pub const FRAME_RATE_SENT: &str = "googFrameRateSent";
    pub const FRAME_HEIGHT_SENT: &str = "googFrameHeightSent";
    pub const FRAME_WIDTH_SENT: &str = "googFrameWidthSent";
}

/// Stat names reported by track-scoped hosts.
mod track {
    pub const CANDIDATE_PAIR_TYPE: &str = "candidatepair";
    pub const STATE: &str = "state";
    pub const STATE_SUCCEEDED: &str = "succeeded";
    pub const MEDIA_TYPE: &str = "mediaType";
    pub const IS_REMOTE: &str = "isRemote";
    pub const RTT: &str = "mozRtt";
    pub const FRAMERATE_MEAN: &str = "framerateMean";
}

const PACKETS_LOST: &str = "packetsLost";
const PACKETS_SENT: &str = "packetsSent";
const BYTES_SENT: &str = "bytesSent";

fn pick(record: &RawRecord, name: &str) -> Option<StatValue> {
    record.get(name).cloned()
}

/// Accumulates host record batches and the summary derived from them.
#[derive(Debug)]
pub struct StatsCollector {
    config: NormalizerConfig,
    render_dimensions: Option<RenderDimensions>,
    summary: StatsSummary,
    channel_sources: HashSet<String>,
    failure: Option<Error>,
    completed: bool,
}

impl StatsCollector {
    pub fn new(config: NormalizerConfig) -> Self {
        let render_dimensions = config.render_dimensions();
        Self {
            config,
            render_dimensions,
            summary: StatsSummary::new(),
            channel_sources: HashSet::new(),
            failure: None,
            completed: false,
        }
    }

    /// Overrides the configured rendering-surface size for this collection.
    pub fn with_render_dimensions(mut self, render_dimensions: Option<RenderDimensions>) -> Self {
        if render_dimensions.is_some() {
            self.render_dimensions = render_dimensions;
        }
        self
    }

    pub fn summary(&self) -> &StatsSummary {
        &self.summary
    }

    pub fn into_summary(self) -> StatsSummary {
        self.summary
    }

    /// Records a failed host request. Only the first failure is kept.
    pub fn on_request_failed(&mut self, err: Error) {
        self.failure.get_or_insert(err);
    }

    /// The first failed host request, if any.
    pub fn failure(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    /// The error explaining why completion was not reached: the first
    /// request failure, or else which media are still missing.
    pub fn incomplete_error(&self) -> Error {
        match &self.failure {
            Some(err) => err.clone(),
            None => Error::ErrIncompleteResult {
                audio: self.summary.audio.has_bytes_sent(),
                video: self.summary.video.has_bytes_sent(),
            },
        }
    }

    /// Whether completion has already been reported.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Appends a batch of host records and re-packages the summary.
    ///
    /// Returns `true` exactly once: on the first batch after which both audio
    /// and video carry a sent-byte count. Later batches are still packaged
    /// but return `false`.
    pub fn handle_records(&mut self, records: Vec<RawRecord>) -> bool {
        debug!("packaging batch of {} records", records.len());
        self.summary.results.extend(records);
        self.package_stats();

        if !self.completed && self.summary.is_complete() {
            debug!(
                "stats complete after {} records",
                self.summary.results.len()
            );
            self.completed = true;
            return true;
        }
        false
    }

    fn package_stats(&mut self) {
        let results = std::mem::take(&mut self.summary.results);
        for record in &results {
            self.capture_timestamp(record);
            self.package_channel(record);
            self.package_audio(record);
            self.package_video(record);
        }
        self.summary.results = results;
    }

    fn capture_timestamp(&mut self, record: &RawRecord) {
        // Inactive entries carry the epoch.
        if self.summary.timestamp != 0.0 {
            return;
        }
        match record.timestamp_millis() {
            Some(timestamp) if timestamp != 0.0 => self.summary.timestamp = timestamp,
            _ => {}
        }
    }

    fn package_channel(&mut self, record: &RawRecord) {
        if record.typ == connection::CANDIDATE_PAIR_TYPE
            && record.flag(connection::ACTIVE_CONNECTION)
        {
            let channel = ChannelDescriptor {
                id: record.get(connection::CHANNEL_ID).map(|v| v.to_string()),
                local: CandidateInfo {
                    candidate_type: record
                        .get(connection::LOCAL_CANDIDATE_TYPE)
                        .map(|v| v.to_string()),
                    ip_address: record.get(connection::LOCAL_ADDRESS).map(|v| v.to_string()),
                },
                remote: CandidateInfo {
                    candidate_type: record
                        .get(connection::REMOTE_CANDIDATE_TYPE)
                        .map(|v| v.to_string()),
                    ip_address: record
                        .get(connection::REMOTE_ADDRESS)
                        .map(|v| v.to_string()),
                },
                transport: record
                    .get(connection::TRANSPORT_TYPE)
                    .map(|v| v.to_string()),
            };
            // Passes re-scan every record, so each pair is listed once.
            if self.channel_sources.insert(record.id.clone()) {
                trace!("active channel from {}", record.id);
                self.summary.channels.push(channel);
            }
        }

        if record.typ == track::CANDIDATE_PAIR_TYPE
            && record.get_str(track::STATE) == Some(track::STATE_SUCCEEDED)
        {
            // Track-scoped pairs do not say which pair carries media.
            trace!("ignoring succeeded candidate pair {}", record.id);
        }
    }

    fn package_audio(&mut self, record: &RawRecord) {
        if !record.is_truthy(BYTES_SENT) {
            return;
        }

        if record
            .get_str(connection::CODEC_NAME)
            .is_some_and(|codec| self.config.is_audio_codec(codec))
        {
            trace!("audio sender {}", record.id);
            self.summary.audio.merge([
                (metric::INPUT_LEVEL, pick(record, connection::AUDIO_INPUT_LEVEL)),
                (metric::PACKETS_LOST, pick(record, PACKETS_LOST)),
                (metric::RTT, pick(record, connection::RTT)),
                (metric::PACKETS_SENT, pick(record, PACKETS_SENT)),
                (metric::BYTES_SENT, pick(record, BYTES_SENT)),
            ]);
        }

        if record.get_str(track::MEDIA_TYPE) == Some("audio") {
            if record.flag(track::IS_REMOTE) {
                trace!("remote audio {}", record.id);
                self.summary.audio.merge([
                    (metric::INPUT_LEVEL, Some(StatValue::unknown())),
                    (metric::RTT, pick(record, track::RTT)),
                    (metric::PACKETS_LOST, pick(record, PACKETS_LOST)),
                ]);
            } else {
                trace!("local audio {}", record.id);
                self.summary.audio.merge([
                    (metric::PACKETS_SENT, pick(record, PACKETS_SENT)),
                    (metric::BYTES_SENT, pick(record, BYTES_SENT)),
                ]);
            }
        }
    }

    fn package_video(&mut self, record: &RawRecord) {
        if !record.is_truthy(BYTES_SENT) {
            return;
        }

        if record
            .get_str(connection::CODEC_NAME)
            .is_some_and(|codec| self.config.is_video_codec(codec))
        {
            trace!("video sender {}", record.id);
            self.summary.video.merge([
                (
                    metric::FRAME_HEIGHT_INPUT,
                    pick(record, connection::FRAME_HEIGHT_INPUT),
                ),
                (
                    metric::FRAME_WIDTH_INPUT,
                    pick(record, connection::FRAME_WIDTH_INPUT),
                ),
                (metric::RTT, pick(record, connection::RTT)),
                (metric::PACKETS_LOST, pick(record, PACKETS_LOST)),
                (metric::PACKETS_SENT, pick(record, PACKETS_SENT)),
                (
                    metric::FRAME_RATE_INPUT,
                    pick(record, connection::FRAME_RATE_INPUT),
                ),
                (
                    metric::FRAME_RATE_SENT,
                    pick(record, connection::FRAME_RATE_SENT),
                ),
                (
                    metric::FRAME_HEIGHT_SENT,
                    pick(record, connection::FRAME_HEIGHT_SENT),
                ),
                (
                    metric::FRAME_WIDTH_SENT,
                    pick(record, connection::FRAME_WIDTH_SENT),
                ),
                (metric::BYTES_SENT, pick(record, BYTES_SENT)),
            ]);
        }

        if record.get_str(track::MEDIA_TYPE) == Some("video") {
            if record.flag(track::IS_REMOTE) {
                trace!("remote video {}", record.id);
                self.summary.video.merge([
                    (metric::RTT, pick(record, track::RTT)),
                    (metric::PACKETS_LOST, pick(record, PACKETS_LOST)),
                ]);
            } else {
                trace!("local video {}", record.id);
                let render = self.render_dimensions;
                let frame_rate_input = record
                    .get(track::FRAMERATE_MEAN)
                    .and_then(StatValue::as_f64)
                    .map(|fps| StatValue::Number(fps.round()));
                self.summary.video.merge([
                    (
                        metric::FRAME_HEIGHT_INPUT,
                        render.map(|r| StatValue::from(r.height)),
                    ),
                    (
                        metric::FRAME_WIDTH_INPUT,
                        render.map(|r| StatValue::from(r.width)),
                    ),
                    (metric::PACKETS_SENT, pick(record, PACKETS_SENT)),
                    (metric::FRAME_RATE_INPUT, frame_rate_input),
                    (metric::FRAME_RATE_SENT, Some(StatValue::unknown())),
                    (metric::FRAME_HEIGHT_SENT, Some(StatValue::unknown())),
                    (metric::FRAME_WIDTH_SENT, Some(StatValue::unknown())),
                    (metric::BYTES_SENT, pick(record, BYTES_SENT)),
                ]);
            }
        }
    }
}

#[cfg(test)]
mod packager_test;
