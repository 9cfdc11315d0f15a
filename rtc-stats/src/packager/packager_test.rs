use super::*;
use crate::config::NormalizerConfigBuilder;

fn collector() -> StatsCollector {
    StatsCollector::new(NormalizerConfig::default())
}

fn connection_audio_sender(bytes_sent: &str) -> RawRecord {
    RawRecord::new("ssrc_1_send", "ssrc")
        .with_timestamp(1_400_000_000_000u64)
        .with_field("googCodecName", "opus")
        .with_field("audioInputLevel", "1200")
        .with_field("packetsLost", "0")
        .with_field("googRtt", "30")
        .with_field("packetsSent", "50")
        .with_field("bytesSent", bytes_sent)
}

fn connection_video_sender(bytes_sent: &str) -> RawRecord {
    RawRecord::new("ssrc_2_send", "ssrc")
        .with_timestamp(1_400_000_000_000u64)
        .with_field("googCodecName", "VP8")
        .with_field("googFrameHeightInput", "480")
        .with_field("googFrameWidthInput", "640")
        .with_field("googFrameRateInput", "30")
        .with_field("googFrameRateSent", "29")
        .with_field("googFrameHeightSent", "240")
        .with_field("googFrameWidthSent", "320")
        .with_field("googRtt", "31")
        .with_field("packetsLost", "1")
        .with_field("packetsSent", "80")
        .with_field("bytesSent", bytes_sent)
}

fn active_pair(active: &str) -> RawRecord {
    RawRecord::new("Conn-audio-1-0", "googCandidatePair")
        .with_field("googActiveConnection", active)
        .with_field("googChannelId", "Channel-audio-1")
        .with_field("googLocalCandidateType", "local")
        .with_field("googLocalAddress", "192.168.1.2:51000")
        .with_field("googRemoteCandidateType", "stun")
        .with_field("googRemoteAddress", "203.0.113.7:62000")
        .with_field("googTransportType", "udp")
}

#[test]
fn test_remote_and_local_audio_merge() {
    let mut c = collector();
    c.handle_records(vec![
        RawRecord::new("outbound_rtcp_audio_0", "inboundrtp")
            .with_field("mediaType", "audio")
            .with_field("isRemote", true)
            .with_field("mozRtt", 50u64)
            .with_field("packetsLost", 2u64)
            .with_field("bytesSent", 900u64),
        RawRecord::new("outbound_rtp_audio_0", "outboundrtp")
            .with_field("mediaType", "audio")
            .with_field("isRemote", false)
            .with_field("bytesSent", 1000u64)
            .with_field("packetsSent", 10u64),
    ]);

    let audio = &c.summary().audio;
    assert_eq!(audio.get(metric::RTT), Some(&StatValue::from(50u64)));
    assert_eq!(audio.get(metric::PACKETS_LOST), Some(&StatValue::from(2u64)));
    assert_eq!(audio.get(metric::BYTES_SENT), Some(&StatValue::from(1000u64)));
    assert_eq!(audio.get(metric::PACKETS_SENT), Some(&StatValue::from(10u64)));
    assert!(audio.get(metric::INPUT_LEVEL).is_some_and(StatValue::is_unknown));
    assert!(c.summary().video.is_empty());
}

#[test]
fn test_merge_keys_never_shrink() {
    let mut c = collector();
    let mut last = (0, 0);

    let batches = vec![
        vec![connection_audio_sender("100")],
        vec![RawRecord::new("ssrc_1_send", "ssrc")
            .with_field("googCodecName", "opus")
            .with_field("bytesSent", "200")],
        vec![connection_video_sender("300")],
        vec![RawRecord::new("outbound_rtp_video_1", "outboundrtp")
            .with_field("mediaType", "video")
            .with_field("bytesSent", 400u64)],
        vec![RawRecord::new("unrelated", "googTrack")],
    ];

    for batch in batches {
        c.handle_records(batch);
        let now = (c.summary().audio.len(), c.summary().video.len());
        assert!(now.0 >= last.0, "audio keys shrank: {last:?} -> {now:?}");
        assert!(now.1 >= last.1, "video keys shrank: {last:?} -> {now:?}");
        last = now;
    }
    assert_eq!(last.0, 5);
}

#[test]
fn test_active_candidate_pair_adds_one_channel() {
    let mut c = collector();
    c.handle_records(vec![active_pair("true")]);

    let channels = &c.summary().channels;
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].id.as_deref(), Some("Channel-audio-1"));
    assert_eq!(channels[0].local.candidate_type.as_deref(), Some("local"));
    assert_eq!(
        channels[0].local.ip_address.as_deref(),
        Some("192.168.1.2:51000")
    );
    assert_eq!(channels[0].remote.candidate_type.as_deref(), Some("stun"));
    assert_eq!(
        channels[0].remote.ip_address.as_deref(),
        Some("203.0.113.7:62000")
    );
    assert_eq!(channels[0].transport.as_deref(), Some("udp"));

    // The pass runs over cumulative records; the same pair must not repeat.
    c.handle_records(vec![connection_audio_sender("100")]);
    assert_eq!(c.summary().channels.len(), 1);
}

#[test]
fn test_distinct_pairs_with_identical_fields_are_both_listed() {
    let mut c = collector();
    let pair = |id: &str| {
        RawRecord::new(id, "googCandidatePair")
            .with_field("googActiveConnection", "true")
            .with_field("googTransportType", "udp")
    };
    c.handle_records(vec![pair("Conn-audio-1-0"), pair("Conn-video-1-0")]);
    assert_eq!(c.summary().channels.len(), 2);
    assert_eq!(c.summary().channels[0], c.summary().channels[1]);

    c.handle_records(vec![connection_audio_sender("100")]);
    assert_eq!(c.summary().channels.len(), 2);
}

#[test]
fn test_inactive_candidate_pair_adds_nothing() {
    let mut c = collector();
    c.handle_records(vec![
        active_pair("false"),
        RawRecord::new("Conn-video-1-0", "googCandidatePair")
            .with_field("googChannelId", "Channel-video-1"),
    ]);
    assert!(c.summary().channels.is_empty());
}

#[test]
fn test_succeeded_track_pair_adds_nothing() {
    let mut c = collector();
    c.handle_records(vec![
        RawRecord::new("3Bx9", "candidatepair")
            .with_field("state", "succeeded")
            .with_field("selected", true),
    ]);
    assert!(c.summary().channels.is_empty());
    assert_eq!(c.summary().results.len(), 1);
}

#[test]
fn test_first_non_zero_timestamp_wins() {
    let mut c = collector();
    c.handle_records(vec![
        RawRecord::new("a", "googTrack").with_timestamp(0u64),
        RawRecord::new("b", "googTrack").with_timestamp(1_000u64),
        RawRecord::new("c", "googTrack").with_timestamp(2_000u64),
    ]);
    assert_eq!(c.summary().timestamp, 1_000.0);

    c.handle_records(vec![RawRecord::new("d", "googTrack").with_timestamp(500u64)]);
    assert_eq!(c.summary().timestamp, 1_000.0);
}

#[test]
fn test_epoch_and_unreadable_timestamps_are_skipped() {
    let mut c = collector();
    c.handle_records(vec![
        RawRecord::new("a", "googTrack").with_timestamp("1970-01-01T00:00:00Z"),
        RawRecord::new("b", "googTrack").with_timestamp("not a date"),
        RawRecord::new("c", "googTrack"),
    ]);
    assert_eq!(c.summary().timestamp, 0.0);
}

#[test]
fn test_completion_reported_once() {
    let mut c = collector();
    assert!(!c.handle_records(vec![connection_audio_sender("1000")]));
    assert!(!c.is_completed());

    assert!(c.handle_records(vec![connection_video_sender("2000")]));
    assert!(c.is_completed());

    assert!(!c.handle_records(vec![connection_video_sender("3000")]));
    assert_eq!(
        c.summary().video.bytes_sent(),
        Some(&StatValue::from("3000"))
    );
}

#[test]
fn test_audio_only_never_completes() {
    let mut c = collector();
    assert!(!c.handle_records(vec![connection_audio_sender("1000")]));
    assert!(!c.handle_records(vec![connection_audio_sender("2000")]));
    assert!(!c.summary().is_complete());
}

#[test]
fn test_zero_bytes_sent_fails_the_gate() {
    let mut c = collector();
    c.handle_records(vec![
        connection_audio_sender(""),
        RawRecord::new("outbound_rtp_video_1", "outboundrtp")
            .with_field("mediaType", "video")
            .with_field("bytesSent", 0u64)
            .with_field("packetsSent", 3u64),
    ]);
    assert!(c.summary().audio.is_empty());
    assert!(c.summary().video.is_empty());
}

#[test]
fn test_connection_scoped_video_fields() {
    let mut c = collector();
    c.handle_records(vec![connection_video_sender("2000")]);

    let video = &c.summary().video;
    assert_eq!(video.len(), 10);
    assert_eq!(video.get(metric::FRAME_HEIGHT_INPUT), Some(&StatValue::from("480")));
    assert_eq!(video.get(metric::FRAME_WIDTH_INPUT), Some(&StatValue::from("640")));
    assert_eq!(video.get(metric::FRAME_RATE_INPUT), Some(&StatValue::from("30")));
    assert_eq!(video.get(metric::FRAME_RATE_SENT), Some(&StatValue::from("29")));
    assert_eq!(video.get(metric::FRAME_HEIGHT_SENT), Some(&StatValue::from("240")));
    assert_eq!(video.get(metric::FRAME_WIDTH_SENT), Some(&StatValue::from("320")));
    assert_eq!(video.get(metric::RTT), Some(&StatValue::from("31")));
}

#[test]
fn test_track_scoped_local_video_uses_render_dimensions() {
    let mut c = collector().with_render_dimensions(Some(RenderDimensions::new(1280, 720)));
    c.handle_records(vec![
        RawRecord::new("outbound_rtp_video_1", "outboundrtp")
            .with_field("mediaType", "video")
            .with_field("isRemote", false)
            .with_field("framerateMean", 29.6)
            .with_field("packetsSent", 120u64)
            .with_field("bytesSent", 64_000u64),
        RawRecord::new("outbound_rtcp_video_1", "inboundrtp")
            .with_field("mediaType", "video")
            .with_field("isRemote", true)
            .with_field("mozRtt", 42u64)
            .with_field("packetsLost", 4u64)
            .with_field("bytesSent", 63_000u64),
    ]);

    let video = &c.summary().video;
    assert_eq!(video.get(metric::FRAME_WIDTH_INPUT), Some(&StatValue::from(1280u32)));
    assert_eq!(video.get(metric::FRAME_HEIGHT_INPUT), Some(&StatValue::from(720u32)));
    assert_eq!(video.get(metric::FRAME_RATE_INPUT), Some(&StatValue::Number(30.0)));
    assert!(video.get(metric::FRAME_RATE_SENT).is_some_and(StatValue::is_unknown));
    assert!(video.get(metric::FRAME_HEIGHT_SENT).is_some_and(StatValue::is_unknown));
    assert!(video.get(metric::FRAME_WIDTH_SENT).is_some_and(StatValue::is_unknown));
    assert_eq!(video.get(metric::RTT), Some(&StatValue::from(42u64)));
    assert_eq!(video.get(metric::PACKETS_LOST), Some(&StatValue::from(4u64)));
    assert_eq!(video.bytes_sent(), Some(&StatValue::from(64_000u64)));
}

#[test]
fn test_track_scoped_local_video_without_render_dimensions() {
    let mut c = collector();
    c.handle_records(vec![
        RawRecord::new("outbound_rtp_video_1", "outboundrtp")
            .with_field("mediaType", "video")
            .with_field("bytesSent", 64_000u64),
    ]);

    let video = &c.summary().video;
    assert!(!video.contains(metric::FRAME_WIDTH_INPUT));
    assert!(!video.contains(metric::FRAME_HEIGHT_INPUT));
    assert!(!video.contains(metric::FRAME_RATE_INPUT));
    assert!(video.has_bytes_sent());
}

#[test]
fn test_configured_codecs() {
    let config = NormalizerConfigBuilder::new()
        .with_video_codecs(vec!["H264".to_owned()])
        .build();
    let mut c = StatsCollector::new(config);

    c.handle_records(vec![connection_video_sender("2000")]);
    assert!(c.summary().video.is_empty());

    c.handle_records(vec![
        RawRecord::new("ssrc_3_send", "ssrc")
            .with_field("googCodecName", "H264")
            .with_field("bytesSent", "500"),
    ]);
    assert!(c.summary().video.has_bytes_sent());
}

#[test]
fn test_results_keep_host_order() {
    let mut c = collector();
    c.handle_records(vec![active_pair("true"), connection_audio_sender("1")]);
    c.handle_records(vec![connection_video_sender("2")]);

    let ids: Vec<&str> = c.summary().results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["Conn-audio-1-0", "ssrc_1_send", "ssrc_2_send"]);
}

#[test]
fn test_first_request_failure_is_kept() {
    let mut c = collector();
    assert!(c.failure().is_none());
    assert_eq!(
        c.incomplete_error(),
        Error::ErrIncompleteResult {
            audio: false,
            video: false
        }
    );

    c.on_request_failed(Error::ErrStatsRequestFailed("audio".to_owned()));
    c.on_request_failed(Error::ErrStatsRequestFailed("video".to_owned()));
    assert_eq!(
        c.incomplete_error(),
        Error::ErrStatsRequestFailed("audio".to_owned())
    );
}

#[test]
fn test_incomplete_error_reports_ready_media() {
    let mut c = collector();
    c.handle_records(vec![connection_audio_sender("100")]);
    assert_eq!(
        c.incomplete_error(),
        Error::ErrIncompleteResult {
            audio: true,
            video: false
        }
    );
}
