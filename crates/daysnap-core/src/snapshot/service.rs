use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::auth::Account;
use crate::cache::{CacheManager, CachedData};
use crate::models::{CreateNftRequest, Snapshot, SnapshotMetadata};
use crate::utils::format_day;
use crate::wallet::{MobileWallet, WalletTransport};
use crate::Pubkey;

use super::{browse_snapshots, AssetMinter, AssetReader, NextAction, SnapshotError, SnapshotStorage};

#[derive(Default)]
struct SnapshotState {
    /// Creator the loaded snapshots belong to
    creator: Option<Pubkey>,
    snapshots: Option<Vec<Snapshot>>,
    snapshot_of_the_day: Option<Snapshot>,
    /// Local day `snapshot_of_the_day` counts for
    minted_on: Option<NaiveDate>,
}

impl SnapshotState {
    fn belongs_to(&self, creator: &Pubkey) -> bool {
        self.creator.as_ref() == Some(creator)
    }

    fn has_minted(&self, creator: &Pubkey, day: NaiveDate) -> bool {
        self.belongs_to(creator) && self.snapshot_of_the_day.is_some() && self.minted_on == Some(day)
    }
}

/// Clears the in-flight flag when an operation ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SnapshotError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| SnapshotError::Busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SnapshotService<T> {
    wallet: Arc<MobileWallet<T>>,
    storage: Arc<dyn SnapshotStorage>,
    reader: Arc<dyn AssetReader>,
    minter: Arc<dyn AssetMinter>,
    cache: Option<CacheManager>,
    clock: fn() -> DateTime<Utc>,
    state: Mutex<SnapshotState>,
    loading: AtomicBool,
}

impl<T: WalletTransport> SnapshotService<T> {
    pub fn new(
        wallet: Arc<MobileWallet<T>>,
        storage: Arc<dyn SnapshotStorage>,
        reader: Arc<dyn AssetReader>,
        minter: Arc<dyn AssetMinter>,
    ) -> Self {
        Self {
            wallet,
            storage,
            reader,
            minter,
            cache: None,
            clock: Utc::now,
            state: Mutex::new(SnapshotState::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// Keep fetched snapshot lists on disk for offline browsing
    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn state(&self) -> MutexGuard<'_, SnapshotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn today(&self) -> NaiveDate {
        (self.clock)().with_timezone(&Local).date_naive()
    }

    fn connected_account(&self) -> Result<Account, SnapshotError> {
        self.wallet
            .store()
            .selected_account()
            .ok_or(SnapshotError::NotConnected)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Snapshots loaded for the currently selected account.
    pub fn snapshots(&self) -> Option<Vec<Snapshot>> {
        let account = self.wallet.store().selected_account()?;
        let state = self.state();
        if state.belongs_to(&account.public_key) {
            state.snapshots.clone()
        } else {
            None
        }
    }

    /// Today's snapshot of the currently selected account, once known.
    pub fn snapshot_of_the_day(&self) -> Option<Snapshot> {
        let account = self.wallet.store().selected_account()?;
        let state = self.state();
        if state.has_minted(&account.public_key, self.today()) {
            state.snapshot_of_the_day.clone()
        } else {
            None
        }
    }

    pub fn next_action(&self) -> NextAction {
        if self.is_loading() {
            return NextAction::Wait;
        }
        let Some(account) = self.wallet.store().selected_account() else {
            return NextAction::Connect;
        };
        let state = self.state();
        if !state.belongs_to(&account.public_key) || state.snapshots.is_none() {
            NextAction::FetchSnapshots
        } else if state.has_minted(&account.public_key, self.today()) {
            NextAction::AllDone
        } else {
            NextAction::CreateSnapshot
        }
    }

    /// Connect the wallet and return the selected account.
    pub async fn connect(&self) -> Result<Account, SnapshotError> {
        let account = self.wallet.connect().await?;
        info!(account = %account.public_key, "Connected wallet");
        Ok(account)
    }

    /// Deauthorize and forget everything loaded for the session.
    pub async fn disconnect(&self) -> Result<(), SnapshotError> {
        self.wallet.disconnect().await?;
        *self.state() = SnapshotState::default();
        Ok(())
    }

    /// Load every snapshot minted by the connected account, newest first.
    pub async fn fetch_snapshots(&self) -> Result<Vec<Snapshot>, SnapshotError> {
        let _in_flight = InFlight::acquire(&self.loading)?;
        let account = self.connected_account()?;

        let snapshots =
            browse_snapshots(self.reader.as_ref(), self.storage.as_ref(), &account.public_key).await?;
        let today = self.today();
        let of_the_day = snapshots.iter().find(|s| s.day() == today).cloned();

        self.save_to_cache(&account, &snapshots);
        *self.state() = SnapshotState {
            creator: Some(account.public_key),
            snapshots: Some(snapshots.clone()),
            minted_on: of_the_day.as_ref().map(|_| today),
            snapshot_of_the_day: of_the_day,
        };

        info!(count = snapshots.len(), "Loaded snapshots");
        Ok(snapshots)
    }

    /// Pin the photo and its metadata, then mint today's snapshot.
    pub async fn create_snapshot(
        &self,
        image_path: &Path,
        taken_at: DateTime<Utc>,
    ) -> Result<Snapshot, SnapshotError> {
        let _in_flight = InFlight::acquire(&self.loading)?;
        let account = self.connected_account()?;

        let today = self.today();
        if self.state().has_minted(&account.public_key, today) {
            return Err(SnapshotError::AlreadyMintedToday);
        }

        info!(path = %image_path.display(), "Creating snapshot");
        let image_cid = self.storage.pin_file(image_path).await?;
        let name = format_day(taken_at.with_timezone(&Local).date_naive());
        let metadata = SnapshotMetadata::new(name.clone(), taken_at, image_cid);
        let metadata_cid = self.storage.pin_metadata(&metadata).await?;
        debug!(image = %metadata.image_cid, metadata = %metadata_cid, "Pinned snapshot");

        let request = CreateNftRequest::without_royalties(name, self.storage.gateway_url(&metadata_cid));
        let mint = self
            .minter
            .create_nft(&*self.wallet, &request)
            .await
            .map_err(SnapshotError::Mint)?;

        let asset = self.reader.fetch_asset(&mint).await?;
        let snapshot = Snapshot::from_parts(&asset, &metadata, |cid| self.storage.gateway_url(cid))
            .ok_or_else(|| ApiError::InvalidResponse("pinned image has no CID".to_string()))?;

        let snapshots = {
            let mut state = self.state();
            if !state.belongs_to(&account.public_key) {
                *state = SnapshotState {
                    creator: Some(account.public_key),
                    ..SnapshotState::default()
                };
            }
            if let Some(ref mut list) = state.snapshots {
                list.insert(0, snapshot.clone());
            }
            state.snapshot_of_the_day = Some(snapshot.clone());
            state.minted_on = Some(today);
            state.snapshots.clone()
        };
        if let Some(list) = snapshots {
            self.save_to_cache(&account, &list);
        }

        info!(mint = %snapshot.asset_id, "Minted snapshot");
        Ok(snapshot)
    }

    /// Last cached list for the given creator, if any.
    pub fn cached_snapshots(&self, creator: &str) -> anyhow::Result<Option<CachedData<Vec<Snapshot>>>> {
        match self.cache {
            Some(ref cache) => cache.load_snapshots(creator),
            None => Ok(None),
        }
    }

    fn save_to_cache(&self, account: &Account, snapshots: &[Snapshot]) {
        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.save_snapshots(&account.public_key.to_string(), snapshots) {
                warn!(error = %e, "Failed to cache snapshots");
            }
        }
    }
}
