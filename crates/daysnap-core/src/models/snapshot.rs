use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::DigitalAsset;

/// Off-chain metadata document pinned for every snapshot.
///
/// `description` carries the capture time as unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub name: String,
    pub description: String,
    #[serde(rename = "imageCID")]
    pub image_cid: String,
}

impl SnapshotMetadata {
    pub fn new(name: impl Into<String>, taken_at: DateTime<Utc>, image_cid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: taken_at.timestamp_millis().to_string(),
            image_cid: image_cid.into(),
        }
    }

    /// Capture time, if the description holds a valid timestamp
    pub fn taken_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.description.trim().parse().ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}

/// A minted daily photo, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub asset_id: String,
    pub name: String,
    pub image_url: String,
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// Combine an asset with its metadata document.
    ///
    /// Returns `None` when the metadata lacks an image or a parseable
    /// capture time; such assets are not snapshots.
    pub fn from_parts(
        asset: &DigitalAsset,
        metadata: &SnapshotMetadata,
        gateway_url: impl Fn(&str) -> String,
    ) -> Option<Self> {
        if metadata.image_cid.is_empty() {
            return None;
        }
        Some(Self {
            asset_id: asset.id.clone(),
            name: asset.name.clone(),
            image_url: gateway_url(&metadata.image_cid),
            taken_at: metadata.taken_at()?,
        })
    }

    /// Calendar day of the capture in local time
    pub fn day(&self) -> NaiveDate {
        self.taken_at.with_timezone(&Local).date_naive()
    }
}
