//! AquaFind core - finds nearby drinking-water fountains.
//!
//! The pipeline queries the OpenStreetMap Overpass API, caches the result
//! set on disk for 24 hours, and serves a filtered, sorted list view:
//!
//! - [`api`]: Overpass client and response decoding
//! - [`cache`]: the on-disk fountain envelope
//! - [`repository`]: read-through cache plus CRUD for user-added fountains
//! - [`view`]: distance, search, category filters and sorting

pub mod api;
pub mod cache;
pub mod config;
pub mod geo;
pub mod models;
pub mod repository;
pub mod utils;
pub mod view;

pub use api::{FountainError, OverpassClient, DEFAULT_RADIUS_METERS};
pub use cache::{CacheEnvelope, CacheStore};
pub use config::Config;
pub use geo::Coordinate;
pub use models::{Category, Fountain};
pub use repository::{CacheStatus, FountainRepository};
pub use view::{visible_fountains, FountainListView, FountainWithDistance, SortOption, ViewQuery};
