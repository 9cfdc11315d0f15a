use std::time::Duration;

pub(crate) const DEFAULT_AUDIO_CODEC: &str = "opus";
pub(crate) const DEFAULT_VIDEO_CODEC: &str = "VP8";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Size of the surface the local video is rendered on.
///
/// Track-scoped hosts do not report input frame dimensions, so the caller
/// supplies what its renderer currently shows.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RenderDimensions {
    pub width: u32,
    pub height: u32,
}

impl RenderDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// NormalizerConfig controls how host stats are classified and how long a
/// normalization may wait for them.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizerConfig {
    pub(crate) audio_codecs: Vec<String>,
    pub(crate) video_codecs: Vec<String>,
    pub(crate) timeout: Duration,
    pub(crate) render_dimensions: Option<RenderDimensions>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfigBuilder::default().build()
    }
}

impl NormalizerConfig {
    /// Codec names that mark a connection-scoped record as an audio sender.
    pub fn audio_codecs(&self) -> &[String] {
        &self.audio_codecs
    }

    /// Codec names that mark a connection-scoped record as a video sender.
    pub fn video_codecs(&self) -> &[String] {
        &self.video_codecs
    }

    /// Deadline for a whole normalization.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn render_dimensions(&self) -> Option<RenderDimensions> {
        self.render_dimensions
    }

    pub(crate) fn is_audio_codec(&self, codec: &str) -> bool {
        self.audio_codecs.iter().any(|c| c == codec)
    }

    pub(crate) fn is_video_codec(&self, codec: &str) -> bool {
        self.video_codecs.iter().any(|c| c == codec)
    }
}

#[derive(Debug, Clone)]
pub struct NormalizerConfigBuilder {
    /// audio_codecs lists the codec names of audio sender records,
    /// compared exactly as the host reports them.
    audio_codecs: Vec<String>,

    /// video_codecs lists the codec names of video sender records.
    video_codecs: Vec<String>,

    /// timeout bounds the time until both media summaries are ready.
    timeout: Duration,

    /// render_dimensions is used when a call does not pass its own.
    render_dimensions: Option<RenderDimensions>,
}

impl Default for NormalizerConfigBuilder {
    fn default() -> Self {
        Self {
            audio_codecs: vec![DEFAULT_AUDIO_CODEC.to_owned()],
            video_codecs: vec![DEFAULT_VIDEO_CODEC.to_owned()],
            timeout: DEFAULT_TIMEOUT,
            render_dimensions: None,
        }
    }
}

impl NormalizerConfigBuilder {
    pub fn new() -> Self {
        NormalizerConfigBuilder::default()
    }

    pub fn with_audio_codecs(mut self, audio_codecs: Vec<String>) -> Self {
        self.audio_codecs = audio_codecs;
        self
    }

    pub fn with_video_codecs(mut self, video_codecs: Vec<String>) -> Self {
        self.video_codecs = video_codecs;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_render_dimensions(mut self, render_dimensions: RenderDimensions) -> Self {
        self.render_dimensions = Some(render_dimensions);
        self
    }

    pub fn build(self) -> NormalizerConfig {
        NormalizerConfig {
            audio_codecs: self.audio_codecs,
            video_codecs: self.video_codecs,
            timeout: self.timeout,
            render_dimensions: self.render_dimensions,
        }
    }
}
