//! Read-through fountain repository.
//!
//! `FountainRepository` answers fetches from the cache while it is valid and
//! falls back to the Overpass client otherwise, writing fresh results back.
//! It also owns CRUD for user-authored fountains over the same collection.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{FountainError, OverpassClient};
use crate::cache::CacheStore;
use crate::geo::Coordinate;
use crate::models::Fountain;

/// Cache diagnostics for display.
#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub valid: bool,
    pub age: Option<String>,
    pub path: PathBuf,
}

pub struct FountainRepository {
    client: OverpassClient,
    cache: CacheStore,
    /// Collection last handed to a consumer; `None` until first needed.
    fountains: Option<Vec<Fountain>>,
}

impl FountainRepository {
    pub fn new(client: OverpassClient, cache: CacheStore) -> Self {
        Self {
            client,
            cache,
            fountains: None,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Return cached fountains if the envelope is valid, otherwise query the
    /// remote service and cache the result.
    ///
    /// Remote errors are returned unchanged. A failed cache write is logged
    /// and does not fail the fetch.
    pub async fn fetch_fountains(
        &mut self,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<Vec<Fountain>, FountainError> {
        if let Some(envelope) = self.cache.load() {
            debug!(count = envelope.fountains.len(), "Serving fountains from cache");
            self.fountains = Some(envelope.fountains.clone());
            return Ok(envelope.fountains);
        }

        let fountains = self.client.fetch_fountains(center, radius_meters).await?;
        self.fountains = Some(fountains.clone());
        self.persist(&fountains);
        Ok(fountains)
    }

    /// Drop the cache and fetch from the remote service.
    pub async fn refresh(
        &mut self,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<Vec<Fountain>, FountainError> {
        info!("Invalidating fountain cache");
        self.cache.clear();
        self.fountains = None;
        self.fetch_fountains(center, radius_meters).await
    }

    /// The current collection, seeded from a valid cache if nothing was
    /// fetched yet.
    pub fn fountains(&mut self) -> &[Fountain] {
        self.current()
    }

    /// Add a user-authored fountain. An empty id gets a fresh UUID.
    ///
    /// The collection is persisted with a fresh timestamp. Called before any
    /// fetch (and with no valid cache), that writes a one-record envelope,
    /// and `fetch_fountains` then serves it instead of querying remotely
    /// until it expires. Call [`Self::refresh`] to pull remote data.
    pub fn add_fountain(&mut self, mut fountain: Fountain) -> Result<Fountain, FountainError> {
        if !fountain.coordinate.is_valid() {
            return Err(FountainError::InvalidCoordinate {
                latitude: fountain.coordinate.latitude,
                longitude: fountain.coordinate.longitude,
            });
        }
        if fountain.id.is_empty() {
            fountain.id = Uuid::new_v4().to_string();
        }
        if fountain.date_added.is_none() {
            fountain.date_added = Some(Utc::now());
        }

        let current = self.current();
        if current.iter().any(|f| f.id == fountain.id) {
            return Err(FountainError::DuplicateId(fountain.id));
        }
        current.push(fountain.clone());

        info!(id = %fountain.id, name = %fountain.name, "Added fountain");
        self.persist_current();
        Ok(fountain)
    }

    /// Replace the fountain with the same id.
    pub fn update_fountain(&mut self, fountain: Fountain) -> Result<Fountain, FountainError> {
        if !fountain.coordinate.is_valid() {
            return Err(FountainError::InvalidCoordinate {
                latitude: fountain.coordinate.latitude,
                longitude: fountain.coordinate.longitude,
            });
        }

        let current = self.current();
        let slot = current
            .iter_mut()
            .find(|f| f.id == fountain.id)
            .ok_or_else(|| FountainError::NotFound(fountain.id.clone()))?;
        *slot = fountain.clone();

        info!(id = %fountain.id, "Updated fountain");
        self.persist_current();
        Ok(fountain)
    }

    /// Remove a fountain by id. Unknown ids are a no-op.
    pub fn delete_fountain(&mut self, id: &str) -> Result<(), FountainError> {
        let current = self.current();
        let before = current.len();
        current.retain(|f| f.id != id);

        if current.len() == before {
            debug!(id, "Delete requested for unknown fountain");
            return Ok(());
        }

        info!(id, "Deleted fountain");
        self.persist_current();
        Ok(())
    }

    pub fn cache_status(&self) -> CacheStatus {
        CacheStatus {
            valid: self.cache.is_valid(),
            age: self.cache.age_display(),
            path: self.cache.cache_path(),
        }
    }

    fn current(&mut self) -> &mut Vec<Fountain> {
        let cache = &self.cache;
        self.fountains.get_or_insert_with(|| {
            cache
                .load()
                .map(|envelope| envelope.fountains)
                .unwrap_or_default()
        })
    }

    fn persist_current(&mut self) {
        let fountains = self.current().clone();
        self.persist(&fountains);
    }

    fn persist(&self, fountains: &[Fountain]) {
        if let Err(e) = self.cache.save(fountains) {
            warn!(error = %e, "Failed to save fountains to cache");
        }
    }
}
