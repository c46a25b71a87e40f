//! Snapshot file types.
//!
//! Row identifiers are JSON object keys and therefore strings on disk.
//! They are parsed back when a snapshot is converted to row state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version written into new snapshots.
///
/// 1.0 had statuses and products, 1.1 added channels, 1.2 added restore
/// records and the source hash. All of them load.
pub const SNAPSHOT_VERSION: &str = "1.2";

/// Root snapshot structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Row id -> status code (0..=4).
    #[serde(default)]
    pub row_status: BTreeMap<String, u8>,

    #[serde(default)]
    pub assigned_products: BTreeMap<String, String>,

    #[serde(default)]
    pub assigned_channels: BTreeMap<String, String>,

    #[serde(default = "legacy_version")]
    pub version: String,

    /// State to bring back when the row that retired these rows is released.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub restore_records: BTreeMap<String, RestoreSnapshot>,

    /// SHA-256 of the spreadsheet the snapshot was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sha256: Option<String>,

    /// RFC 3339 time of the last save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

fn legacy_version() -> String {
    "1.0".to_string()
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            row_status: BTreeMap::new(),
            assigned_products: BTreeMap::new(),
            assigned_channels: BTreeMap::new(),
            version: SNAPSHOT_VERSION.to_string(),
            restore_records: BTreeMap::new(),
            source_sha256: None,
            saved_at: None,
        }
    }
}

impl BoardSnapshot {
    /// Stamps the save time and the current format version.
    pub fn touch(&mut self) {
        self.version = SNAPSHOT_VERSION.to_string();
        self.saved_at = Some(Utc::now().to_rfc3339());
    }

    /// Parse the saved_at timestamp.
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
            .as_deref()
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn with_source_hash(mut self, hash: impl Into<String>) -> Self {
        self.source_sha256 = Some(hash.into());
        self
    }

    /// True when the file was written by a newer release than this one.
    pub fn is_newer_format(&self) -> bool {
        version_parts(&self.version) > version_parts(SNAPSHOT_VERSION)
    }

    pub fn is_empty(&self) -> bool {
        self.row_status.is_empty()
            && self.assigned_products.is_empty()
            && self.assigned_channels.is_empty()
    }
}

fn version_parts(version: &str) -> Vec<u32> {
    version
        .split('.')
        .map(|part| part.trim().parse().unwrap_or(0))
        .collect()
}

/// On-disk form of a restore record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreSnapshot {
    pub status: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Capture order; the latest Selected record wins on release.
    #[serde(default)]
    pub sequence: u64,
}
