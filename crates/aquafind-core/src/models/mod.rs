//! Data models for fountain entities.
//!
//! - `Fountain`: the normalized record produced by the Overpass client and
//!   stored in the cache
//! - `Category`, `FountainType`, `FountainStatus`, `Amenity`,
//!   `AccessibilityFeatures`: optional metadata carried on a record

pub mod fountain;

pub use fountain::{
    AccessibilityFeatures, Amenity, Category, Fountain, FountainStatus, FountainType,
    DEFAULT_FOUNTAIN_NAME,
};
