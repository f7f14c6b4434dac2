//! Local caching module for offline data access.
//!
//! This module provides the `CacheStore` for persisting the last fetched
//! fountain set. Data is cached as a single JSON envelope
//! (`{"fountains": [...], "timestamp": ...}`) and treated as absent once it
//! is 24 hours old.

pub mod manager;

pub use manager::{CacheEnvelope, CacheError, CacheStore, CACHE_FILE, CACHE_VALIDITY_HOURS};
