use crate::record::MediaKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The host exposes neither track-scoped nor connection-scoped stats.
    #[error("host does not support WebRTC statistics")]
    ErrUnsupportedHost,
    /// Track-scoped stats were selected but no local track of this kind exists.
    #[error("no local {0} track")]
    ErrMissingLocalTrack(MediaKind),
    /// The host rejected or failed a stats request.
    #[error("stats request failed: {0}")]
    ErrStatsRequestFailed(String),
    /// Normalization stopped before both media summaries carried a sent-byte count.
    #[error("no terminal stats received (audio ready: {audio}, video ready: {video})")]
    ErrIncompleteResult { audio: bool, video: bool },
}
