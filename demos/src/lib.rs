//! In-memory hosts for the demos.
//!
//! [`FixtureHost`] answers stats requests from a JSON fixture instead of a
//! live peer connection, which is enough to drive the normalizer end to end.

use serde::Deserialize;
use stats::{
    Capability, ConnectionStatsResponse, LocalTrack, MediaKind, RawRecord, StatsProvider,
};

/// The fixture shipped with the `simple-stats` example.
pub const BUNDLED_FIXTURE: &str = include_str!("../examples/simple-stats/fixture.json");

/// Canned host answers for every request shape.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StatsFixture {
    #[serde(default)]
    pub audio: Vec<RawRecord>,
    #[serde(default)]
    pub video: Vec<RawRecord>,
    #[serde(default)]
    pub connection: ConnectionStatsResponse,
}

pub struct FixtureHost {
    capability: Capability,
    fixture: StatsFixture,
}

impl FixtureHost {
    pub fn new(capability: Capability, fixture: StatsFixture) -> Self {
        Self {
            capability,
            fixture,
        }
    }

    pub fn from_json(capability: Capability, json: &str) -> serde_json::Result<Self> {
        Ok(Self::new(capability, serde_json::from_str(json)?))
    }

    fn records(&self, kind: MediaKind) -> &[RawRecord] {
        match kind {
            MediaKind::Audio => &self.fixture.audio,
            MediaKind::Video => &self.fixture.video,
        }
    }
}

impl StatsProvider for FixtureHost {
    fn capability(&self) -> Capability {
        self.capability
    }

    fn local_track(&self, kind: MediaKind) -> Option<LocalTrack> {
        (!self.records(kind).is_empty()).then(|| LocalTrack::new(format!("local-{kind}"), kind))
    }

    async fn track_stats(&self, track: &LocalTrack) -> stats::Result<Vec<RawRecord>> {
        Ok(self.records(track.kind).to_vec())
    }

    async fn connection_stats(&self) -> stats::Result<ConnectionStatsResponse> {
        Ok(self.fixture.connection.clone())
    }
}
