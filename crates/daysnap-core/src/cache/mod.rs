//! Local caching module for offline browsing.
//!
//! This module provides the `CacheManager` for storing the snapshot list of
//! each creator locally. Data is cached in JSON format and considered stale
//! after 60 minutes.

pub mod manager;

pub use manager::{CacheManager, CachedData};
