//! Connection-scoped stats reports.
//!
//! Hosts on the connection-scoped path answer a single whole-connection
//! request with a report collection. Each report exposes its stat names and
//! a per-name accessor rather than a plain dictionary, so it has to be
//! flattened field by field before classification.

use crate::record::{RawRecord, StatValue, deserialize_present_fields};
use ::serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Names owned by the record identity; a stat with one of these names is dropped.
const RESERVED_NAMES: [&str; 3] = ["id", "type", "timestamp"];

/// A single report of a connection-scoped response.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatsReport {
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<StatValue>,
    #[serde(default, deserialize_with = "deserialize_present_fields")]
    stats: BTreeMap<String, StatValue>,
}

impl ConnectionStatsReport {
    pub fn new(id: impl Into<String>, typ: impl Into<String>) -> Self {
        ConnectionStatsReport {
            id: id.into(),
            typ: typ.into(),
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<StatValue>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_stat(mut self, name: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.stats.insert(name.into(), value.into());
        self
    }

    /// Returns an iterator over all stat names in this report.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stats.keys().map(|s| s.as_str())
    }

    /// Gets a stat value by name.
    pub fn stat(&self, name: &str) -> Option<&StatValue> {
        self.stats.get(name)
    }
}

impl From<&ConnectionStatsReport> for RawRecord {
    fn from(report: &ConnectionStatsReport) -> Self {
        let mut record = RawRecord::new(report.id.clone(), report.typ.clone());
        for name in report.names() {
            if RESERVED_NAMES.contains(&name) {
                continue;
            }
            if let Some(value) = report.stat(name) {
                record.fields.insert(name.to_owned(), value.clone());
            }
        }
        record.timestamp = report.timestamp.clone();
        record
    }
}

/// The answer to a whole-connection stats request.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionStatsResponse {
    reports: Vec<ConnectionStatsReport>,
}

impl ConnectionStatsResponse {
    pub fn new(reports: Vec<ConnectionStatsReport>) -> Self {
        Self { reports }
    }

    /// Returns the reports in host order.
    pub fn result(&self) -> &[ConnectionStatsReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Flattens every report into a [`RawRecord`], keeping host order.
    pub fn to_records(&self) -> Vec<RawRecord> {
        self.reports.iter().map(RawRecord::from).collect()
    }
}
