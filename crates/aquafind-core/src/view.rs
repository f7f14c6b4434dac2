//! Filtered, sorted fountain list for a presentation layer.
//!
//! `visible_fountains` is the pure core: it attaches distances, applies the
//! category and search filters, and orders the result. `FountainListView`
//! holds the list state and recomputes the visible sequence on every command.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::api::FountainError;
use crate::geo::Coordinate;
use crate::models::{Category, Fountain};
use crate::repository::FountainRepository;
use crate::utils::contains_ignore_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    Distance,
    Name,
    Rating,
    Newest,
}

impl SortOption {
    pub fn label(&self) -> &'static str {
        match self {
            SortOption::Distance => "Distance",
            SortOption::Name => "Name",
            SortOption::Rating => "Rating",
            SortOption::Newest => "Newest",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "distance" => Some(SortOption::Distance),
            "name" => Some(SortOption::Name),
            "rating" => Some(SortOption::Rating),
            "newest" => Some(SortOption::Newest),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Filter and sort settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewQuery {
    pub search_text: String,
    pub category: Category,
    pub sort: SortOption,
}

/// A fountain paired with its distance from the caller, when known.
#[derive(Debug, Clone, PartialEq)]
pub struct FountainWithDistance {
    pub fountain: Fountain,
    pub distance_meters: Option<f64>,
}

fn matches_search(fountain: &Fountain, query: &str) -> bool {
    contains_ignore_case(&fountain.name, query)
        || fountain
            .address
            .as_ref()
            .map(|s| contains_ignore_case(s, query))
            .unwrap_or(false)
        || contains_ignore_case(&fountain.description, query)
}

/// Known values first in `cmp` order; `None` after, keeping input order.
fn cmp_known_first<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &FountainWithDistance, b: &FountainWithDistance, sort: SortOption) -> Ordering {
    match sort {
        SortOption::Distance => {
            cmp_known_first(a.distance_meters, b.distance_meters, |x, y| x.total_cmp(&y))
        }
        SortOption::Name => a.fountain.name.cmp(&b.fountain.name),
        SortOption::Rating => {
            cmp_known_first(a.fountain.rating, b.fountain.rating, |x, y| y.total_cmp(&x))
        }
        SortOption::Newest => {
            cmp_known_first(a.fountain.date_added, b.fountain.date_added, |x, y| y.cmp(&x))
        }
    }
}

/// Compute the visible list for `fountains` under `query`.
///
/// Sorting is stable, so ties keep their input order.
pub fn visible_fountains(
    fountains: &[Fountain],
    query: &ViewQuery,
    location: Option<&Coordinate>,
) -> Vec<FountainWithDistance> {
    // Matched as typed; surrounding whitespace is part of the needle
    let search = query.search_text.as_str();

    let mut visible: Vec<FountainWithDistance> = fountains
        .iter()
        .filter(|f| query.category == Category::All || f.category == query.category)
        .filter(|f| search.is_empty() || matches_search(f, search))
        .map(|f| FountainWithDistance {
            fountain: f.clone(),
            distance_meters: location.map(|loc| f.distance_from(loc)),
        })
        .collect();

    visible.sort_by(|a, b| compare(a, b, query.sort));
    visible
}

/// List state: the full collection, active filters, caller location, and the
/// derived visible sequence.
#[derive(Debug, Default)]
pub struct FountainListView {
    fountains: Vec<Fountain>,
    query: ViewQuery,
    user_location: Option<Coordinate>,
    visible: Vec<FountainWithDistance>,
    is_loading: bool,
    error_message: Option<String>,
}

impl FountainListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(location: Coordinate) -> Self {
        Self {
            user_location: Some(location),
            ..Self::default()
        }
    }

    // ===== Loading =====

    /// Load fountains through the repository.
    ///
    /// On failure the collection is emptied and the error message is kept
    /// for display; the error is also returned.
    pub async fn load(
        &mut self,
        repository: &mut FountainRepository,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<(), FountainError> {
        self.is_loading = true;
        self.error_message = None;
        let result = repository.fetch_fountains(center, radius_meters).await;
        self.finish_load(result)
    }

    /// Like `load`, but invalidates the cache first.
    pub async fn refresh(
        &mut self,
        repository: &mut FountainRepository,
        center: Coordinate,
        radius_meters: f64,
    ) -> Result<(), FountainError> {
        self.is_loading = true;
        self.error_message = None;
        let result = repository.refresh(center, radius_meters).await;
        self.finish_load(result)
    }

    fn finish_load(&mut self, result: Result<Vec<Fountain>, FountainError>) -> Result<(), FountainError> {
        self.is_loading = false;
        match result {
            Ok(fountains) => {
                self.set_fountains(fountains);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load fountains");
                self.error_message = Some(e.to_string());
                self.set_fountains(Vec::new());
                Err(e)
            }
        }
    }

    /// Replace the collection and recompute.
    pub fn set_fountains(&mut self, fountains: Vec<Fountain>) {
        self.fountains = fountains;
        self.filter_locations();
    }

    // ===== Commands =====

    /// Recompute the visible sequence from the current state.
    pub fn filter_locations(&mut self) {
        self.visible = visible_fountains(&self.fountains, &self.query, self.user_location.as_ref());
        debug!(
            total = self.fountains.len(),
            visible = self.visible.len(),
            sort = %self.query.sort,
            "Recomputed fountain list"
        );
    }

    pub fn update_search_text(&mut self, text: impl Into<String>) {
        self.query.search_text = text.into();
        self.filter_locations();
    }

    pub fn update_category(&mut self, category: Category) {
        self.query.category = category;
        self.filter_locations();
    }

    pub fn update_sort_option(&mut self, sort: SortOption) {
        self.query.sort = sort;
        self.filter_locations();
    }

    pub fn update_user_location(&mut self, location: Option<Coordinate>) {
        self.user_location = location;
        self.filter_locations();
    }

    pub fn clear_filters(&mut self) {
        self.query.search_text.clear();
        self.query.category = Category::All;
        self.filter_locations();
    }

    pub fn dismiss_error(&mut self) {
        self.error_message = None;
    }

    // ===== Accessors =====

    pub fn visible(&self) -> &[FountainWithDistance] {
        &self.visible
    }

    pub fn fountains(&self) -> &[Fountain] {
        &self.fountains
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn user_location(&self) -> Option<&Coordinate> {
        self.user_location.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Fountains of one category, ignoring the active filters.
    pub fn fountains_in_category(&self, category: Category) -> Vec<&Fountain> {
        self.fountains
            .iter()
            .filter(|f| category == Category::All || f.category == category)
            .collect()
    }

    /// Fountains within `meters` of the caller. Empty without a location.
    pub fn nearby(&self, meters: f64) -> Vec<&Fountain> {
        match self.user_location {
            Some(location) => self
                .fountains
                .iter()
                .filter(|f| f.distance_from(&location) <= meters)
                .collect(),
            None => Vec::new(),
        }
    }
}
