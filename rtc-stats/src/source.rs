//! The host side of a normalization.
//!
//! A [`StatsProvider`] wraps whatever peer connection the application runs
//! and answers stats requests in one of two shapes. The shape is detected once,
//! when the normalizer is built, and kept as a [`StatsSource`].

use crate::error::{Error, Result};
use crate::record::{MediaKind, RawRecord};
use crate::report::ConnectionStatsResponse;
use std::fmt;

/// What a host reports about its stats API.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Stats are requested per local track and come back as plain records.
    TrackScoped,
    /// Stats are requested for the whole connection and come back as a
    /// report collection.
    ConnectionScoped,
    /// No stats API at all.
    Unsupported,
}

/// The request shape a normalizer uses, fixed at construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatsSource {
    TrackScoped,
    ConnectionScoped,
}

impl StatsSource {
    pub fn from_capability(capability: Capability) -> Result<Self> {
        match capability {
            Capability::TrackScoped => Ok(StatsSource::TrackScoped),
            Capability::ConnectionScoped => Ok(StatsSource::ConnectionScoped),
            Capability::Unsupported => Err(Error::ErrUnsupportedHost),
        }
    }
}

impl fmt::Display for StatsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatsSource::TrackScoped => "track-scoped",
            StatsSource::ConnectionScoped => "connection-scoped",
        };
        write!(f, "{s}")
    }
}

/// A local media track stats can be requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    pub id: String,
    pub kind: MediaKind,
}

impl LocalTrack {
    pub fn new(id: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// A peer connection able to produce raw stats.
///
/// Hosts implement the request shape matching their [`Capability`]; the
/// other one keeps its default, which fails with
/// [`Error::ErrUnsupportedHost`]. A rejected request should be reported as
/// [`Error::ErrStatsRequestFailed`].
#[allow(async_fn_in_trait)]
pub trait StatsProvider {
    fn capability(&self) -> Capability;

    /// The first track of `kind` in the first local stream, if any.
    fn local_track(&self, _kind: MediaKind) -> Option<LocalTrack> {
        None
    }

    async fn track_stats(&self, _track: &LocalTrack) -> Result<Vec<RawRecord>> {
        Err(Error::ErrUnsupportedHost)
    }

    async fn connection_stats(&self) -> Result<ConnectionStatsResponse> {
        Err(Error::ErrUnsupportedHost)
    }
}
