use crate::config::{NormalizerConfig, RenderDimensions};
use crate::error::{Error, Result};
use crate::packager::StatsCollector;
use crate::record::{MediaKind, RawRecord};
use crate::source::{LocalTrack, StatsProvider, StatsSource};
use crate::summary::StatsSummary;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use log::{debug, warn};

/// Normalizes the stats of one peer connection into [`StatsSummary`]s.
///
/// # Example
///
/// ```ignore
/// use rtc_stats::{NormalizerConfig, SimpleStats};
///
/// let simple_stats = SimpleStats::new(peer_connection, NormalizerConfig::default())?;
/// simple_stats
///     .get_simple_stats(None, |stats| {
///         println!("audio bytes sent: {:?}", stats.audio.bytes_sent());
///     })
///     .await?;
/// ```
pub struct SimpleStats<P: StatsProvider> {
    provider: P,
    source: StatsSource,
    config: NormalizerConfig,
}

impl<P: StatsProvider> SimpleStats<P> {
    /// Probes `provider` once and fixes the request shape for its lifetime.
    pub fn new(provider: P, config: NormalizerConfig) -> Result<Self> {
        let capability = provider.capability();
        let source = StatsSource::from_capability(capability).inspect_err(|_| {
            warn!("host does not support WebRTC statistics");
        })?;
        debug!("using {source} stats");

        Ok(Self {
            provider,
            source,
            config,
        })
    }

    pub fn source(&self) -> StatsSource {
        self.source
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Requests stats and resolves with the first summary in which both
    /// audio and video carry a sent-byte count.
    ///
    /// `render_dimensions` overrides the configured rendering-surface size
    /// for this call. Fails with [`Error::ErrIncompleteResult`] when the host
    /// stops answering, or answers without both media, before the configured
    /// timeout. If a request failed along the way, that first
    /// [`Error::ErrStatsRequestFailed`] is returned instead.
    pub async fn normalize(
        &self,
        render_dimensions: Option<RenderDimensions>,
    ) -> Result<StatsSummary> {
        let mut collector =
            StatsCollector::new(self.config.clone()).with_render_dimensions(render_dimensions);

        let timeout = self.config.timeout();
        let outcome = tokio::time::timeout(timeout, self.collect(&mut collector)).await;
        match outcome {
            Ok(Ok(())) => Ok(collector.into_summary()),
            Ok(Err(err)) => Err(err),
            Err(_) => {
                warn!("no complete stats within {timeout:?}");
                Err(collector.incomplete_error())
            }
        }
    }

    /// Runs [`normalize`](Self::normalize) and hands the summary to
    /// `callback`, which is invoked at most once.
    pub async fn get_simple_stats<F>(
        &self,
        render_dimensions: Option<RenderDimensions>,
        callback: F,
    ) -> Result<()>
    where
        F: FnOnce(StatsSummary),
    {
        let summary = self.normalize(render_dimensions).await?;
        callback(summary);
        Ok(())
    }

    async fn collect(&self, collector: &mut StatsCollector) -> Result<()> {
        match self.source {
            StatsSource::TrackScoped => self.collect_track_scoped(collector).await,
            StatsSource::ConnectionScoped => self.collect_connection_scoped(collector).await,
        }
    }

    async fn collect_track_scoped(&self, collector: &mut StatsCollector) -> Result<()> {
        let video = self
            .provider
            .local_track(MediaKind::Video)
            .ok_or(Error::ErrMissingLocalTrack(MediaKind::Video))?;
        let audio = self
            .provider
            .local_track(MediaKind::Audio)
            .ok_or(Error::ErrMissingLocalTrack(MediaKind::Audio))?;

        let mut pending = FuturesUnordered::new();
        pending.push(self.request_track(&video));
        pending.push(self.request_track(&audio));

        // Either request may finish first; a failed one does not cancel the other.
        while let Some((kind, result)) = pending.next().await {
            match result {
                Ok(records) => {
                    debug!("{} {kind} stats records", records.len());
                    if collector.handle_records(records) {
                        return Ok(());
                    }
                }
                Err(err) => {
                    warn!("{kind} stats request failed: {err}");
                    collector.on_request_failed(err);
                }
            }
        }

        Err(collector.incomplete_error())
    }

    async fn request_track(&self, track: &LocalTrack) -> (MediaKind, Result<Vec<RawRecord>>) {
        (track.kind, self.provider.track_stats(track).await)
    }

    async fn collect_connection_scoped(&self, collector: &mut StatsCollector) -> Result<()> {
        let response = self
            .provider
            .connection_stats()
            .await
            .inspect_err(|err| warn!("connection stats request failed: {err}"))?;
        debug!("{} connection stats reports", response.len());

        if collector.handle_records(response.to_records()) {
            Ok(())
        } else {
            Err(collector.incomplete_error())
        }
    }
}
