use futures::future::join_all;
use solana_pubkey::Pubkey;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::models::{DigitalAsset, Snapshot};

use super::{AssetReader, SnapshotStorage};

/// List the snapshots minted by `creator`, newest first.
///
/// Metadata documents are fetched concurrently. Assets without metadata,
/// with an unreadable document, or whose document does not describe a
/// snapshot are skipped.
pub async fn browse_snapshots(
    reader: &dyn AssetReader,
    storage: &dyn SnapshotStorage,
    creator: &Pubkey,
) -> Result<Vec<Snapshot>, ApiError> {
    let assets = reader.fetch_assets_by_creator(creator).await?;
    debug!(count = assets.len(), creator = %creator, "Fetched assets");

    let candidates: Vec<DigitalAsset> = assets.into_iter().filter(|a| a.has_metadata()).collect();
    let results = join_all(candidates.iter().map(|asset| storage.fetch_metadata(&asset.uri))).await;

    let mut snapshots: Vec<Snapshot> = candidates
        .iter()
        .zip(results)
        .filter_map(|(asset, result)| match result {
            Ok(metadata) => Snapshot::from_parts(asset, &metadata, |cid| storage.gateway_url(cid)),
            Err(e) => {
                warn!(asset = %asset.id, error = %e, "Failed to fetch snapshot metadata");
                None
            }
        })
        .collect();

    snapshots.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
    Ok(snapshots)
}
