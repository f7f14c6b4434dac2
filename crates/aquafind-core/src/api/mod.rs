//! Overpass API client module.
//!
//! This module provides the `OverpassClient` for querying OpenStreetMap's
//! Overpass interpreter for drinking-water nodes around a point, and the
//! response decoding that turns raw tagged elements into `Fountain` records.

pub mod client;
pub mod error;
pub mod overpass;

pub use client::{OverpassClient, DEFAULT_OVERPASS_URL, DEFAULT_RADIUS_METERS};
pub use error::FountainError;
