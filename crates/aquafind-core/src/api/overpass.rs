//! Overpass QL query building and response decoding.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::geo::Coordinate;
use crate::models::{Amenity, Category, Fountain, FountainType, DEFAULT_FOUNTAIN_NAME};

use super::FountainError;

/// Server-side query timeout in seconds, embedded in the query itself.
const QUERY_TIMEOUT_SECS: u32 = 25;

/// Used when no tag yields a description.
pub const DEFAULT_DESCRIPTION: &str = "Public drinking water";

/// Joins description clauses.
pub const DESCRIPTION_SEPARATOR: &str = " • ";

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassElement {
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: Option<OverpassTags>,
}

/// The tag keys we understand. Anything else on the element is ignored.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OverpassTags {
    pub name: Option<String>,
    pub description: Option<String>,
    pub operational: Option<String>,
    pub access: Option<String>,
    pub bottle: Option<String>,
    pub wheelchair: Option<String>,
    pub amenity: Option<String>,
    pub indoor: Option<String>,
    #[serde(rename = "addr:housenumber")]
    pub housenumber: Option<String>,
    #[serde(rename = "addr:street")]
    pub street: Option<String>,
    #[serde(rename = "addr:city")]
    pub city: Option<String>,
}

impl OverpassTags {
    /// Single-line address from the `addr:*` tags, if any are present.
    fn address(&self) -> Option<String> {
        let street = match (&self.housenumber, &self.street) {
            (Some(number), Some(street)) => Some(format!("{} {}", number, street)),
            (None, Some(street)) => Some(street.clone()),
            _ => None,
        };
        let parts: Vec<String> = street.into_iter().chain(self.city.clone()).collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Build the Overpass QL query for drinking water nodes around `center`.
pub fn build_query(center: &Coordinate, radius_meters: f64) -> String {
    let around = format!(
        "(around:{},{},{})",
        radius_meters, center.latitude, center.longitude
    );
    format!(
        "[out:json][timeout:{timeout}];\n\
         (\n  \
         node[\"amenity\"=\"drinking_water\"]{around};\n  \
         node[\"amenity\"=\"water_point\"]{around};\n  \
         node[\"drinking_water\"=\"yes\"]{around};\n\
         );\n\
         out body;",
        timeout = QUERY_TIMEOUT_SECS,
        around = around,
    )
}

/// Decode an Overpass JSON body into fountains.
///
/// Elements without both `lat` and `lon` (or with out-of-range values) are
/// dropped. Repeated node ids keep the first occurrence.
pub fn parse_response(body: &[u8]) -> Result<Vec<Fountain>, FountainError> {
    let response: OverpassResponse = serde_json::from_slice(body)?;
    let total = response.elements.len();

    let mut seen = HashSet::new();
    let fountains: Vec<Fountain> = response
        .elements
        .into_iter()
        .filter_map(element_to_fountain)
        .filter(|f| seen.insert(f.id.clone()))
        .collect();

    debug!(
        elements = total,
        fountains = fountains.len(),
        "Parsed Overpass response"
    );
    Ok(fountains)
}

pub(crate) fn element_to_fountain(element: OverpassElement) -> Option<Fountain> {
    let (lat, lon) = match (element.lat, element.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return None,
    };
    let coordinate = match Coordinate::new(lat, lon) {
        Ok(c) => c,
        Err(_) => {
            warn!(id = element.id, lat, lon, "Dropping element with out-of-range coordinate");
            return None;
        }
    };

    let tags = element.tags.unwrap_or_default();

    let name = tags
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_FOUNTAIN_NAME.to_string());
    let description = tags
        .description
        .clone()
        .unwrap_or_else(|| extract_description(&tags));
    let is_operational = tags.operational.as_deref() != Some("no");

    let mut fountain = Fountain::new(element.id.to_string(), name, coordinate);
    fountain.description = description;
    fountain.is_operational = is_operational;
    fountain.category = match tags.amenity.as_deref() {
        Some("water_point") => Category::WaterStation,
        _ => Category::DrinkingFountain,
    };
    fountain.address = tags.address();
    fountain.accessibility.wheelchair_accessible = tags.wheelchair.as_deref() == Some("yes");
    if tags.bottle.as_deref() == Some("yes") {
        fountain.fountain_type = FountainType::BottleFiller;
    }
    if tags.indoor.as_deref() == Some("yes") {
        fountain.amenities.push(Amenity::Indoor);
    }

    Some(fountain)
}

/// Summarize access, bottle refill and wheelchair tags, in that order.
pub(crate) fn extract_description(tags: &OverpassTags) -> String {
    let mut components: Vec<String> = Vec::new();

    if let Some(access) = tags.access.as_deref() {
        if access != "yes" {
            components.push(format!("Access: {}", access));
        }
    }

    if tags.bottle.as_deref() == Some("yes") {
        components.push("Bottle refill available".to_string());
    }

    if tags.wheelchair.as_deref() == Some("yes") {
        components.push("Wheelchair accessible".to_string());
    }

    if components.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        components.join(DESCRIPTION_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<Fountain> {
        parse_response(json.as_bytes()).expect("Failed to parse test JSON")
    }

    #[test]
    fn test_build_query_contains_all_selectors() {
        let center = Coordinate::new(40.7128, -74.006).unwrap();
        let query = build_query(&center, 5000.0);
        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains("node[\"amenity\"=\"drinking_water\"](around:5000,40.7128,-74.006);"));
        assert!(query.contains("node[\"amenity\"=\"water_point\"](around:5000,40.7128,-74.006);"));
        assert!(query.contains("node[\"drinking_water\"=\"yes\"](around:5000,40.7128,-74.006);"));
        assert!(query.ends_with("out body;"));
    }

    #[test]
    fn test_parse_valid_fountain() {
        let fountains = parse(
            r#"{"elements": [{"type": "node", "id": 123456789, "lat": 40.7128, "lon": -74.0060,
                "tags": {"amenity": "drinking_water", "name": "Central Park Fountain"}}]}"#,
        );
        assert_eq!(fountains.len(), 1);
        let f = &fountains[0];
        assert_eq!(f.id, "123456789");
        assert_eq!(f.name, "Central Park Fountain");
        assert_eq!(f.coordinate.latitude, 40.7128);
        assert_eq!(f.coordinate.longitude, -74.0060);
        assert_eq!(f.description, DEFAULT_DESCRIPTION);
        assert!(f.is_operational);
        assert_eq!(f.category, Category::DrinkingFountain);
    }

    #[test]
    fn test_element_missing_coordinate_is_dropped() {
        let fountains = parse(
            r#"{"elements": [
                {"type": "node", "id": 1, "lat": 40.0},
                {"type": "node", "id": 2, "lon": -74.0},
                {"type": "way", "id": 3},
                {"type": "node", "id": 4, "lat": 40.0, "lon": -74.0}
            ]}"#,
        );
        assert_eq!(fountains.len(), 1);
        assert_eq!(fountains[0].id, "4");
    }

    #[test]
    fn test_boundary_coordinates_are_kept() {
        let fountains = parse(
            r#"{"elements": [
                {"type": "node", "id": 888, "lat": 90.0, "lon": 180.0, "tags": {"amenity": "drinking_water"}},
                {"type": "node", "id": 999, "lat": -90.0, "lon": -180.0, "tags": {"amenity": "drinking_water"}}
            ]}"#,
        );
        assert_eq!(fountains.len(), 2);
        assert_eq!(fountains[1].coordinate.latitude, -90.0);
        assert_eq!(fountains[1].coordinate.longitude, -180.0);
    }

    #[test]
    fn test_out_of_range_coordinate_is_dropped() {
        let fountains = parse(r#"{"elements": [{"id": 5, "lat": 91.0, "lon": 0.0}]}"#);
        assert!(fountains.is_empty());
    }

    #[test]
    fn test_missing_name_uses_placeholder() {
        let fountains = parse(r#"{"elements": [{"id": 333, "lat": 41.8781, "lon": -87.6298}]}"#);
        assert_eq!(fountains[0].name, "Drinking Fountain");
        assert_eq!(fountains[0].description, "Public drinking water");
    }

    #[test]
    fn test_operational_only_false_when_no() {
        let fountains = parse(
            r#"{"elements": [
                {"id": 1, "lat": 1.0, "lon": 1.0, "tags": {"operational": "no"}},
                {"id": 2, "lat": 1.0, "lon": 1.0, "tags": {"operational": "yes"}},
                {"id": 3, "lat": 1.0, "lon": 1.0, "tags": {"operational": "unknown"}},
                {"id": 4, "lat": 1.0, "lon": 1.0, "tags": {"operational": null}},
                {"id": 5, "lat": 1.0, "lon": 1.0}
            ]}"#,
        );
        let flags: Vec<bool> = fountains.iter().map(|f| f.is_operational).collect();
        assert_eq!(flags, vec![false, true, true, true, true]);
    }

    #[test]
    fn test_description_access_then_bottle() {
        let tags = OverpassTags {
            access: Some("permit".to_string()),
            bottle: Some("yes".to_string()),
            ..Default::default()
        };
        assert_eq!(
            extract_description(&tags),
            "Access: permit • Bottle refill available"
        );
    }

    #[test]
    fn test_description_all_clauses_in_order() {
        let tags = OverpassTags {
            access: Some("customers".to_string()),
            bottle: Some("yes".to_string()),
            wheelchair: Some("yes".to_string()),
            ..Default::default()
        };
        assert_eq!(
            extract_description(&tags),
            "Access: customers • Bottle refill available • Wheelchair accessible"
        );
    }

    #[test]
    fn test_description_ignores_default_and_negative_values() {
        let tags = OverpassTags {
            access: Some("yes".to_string()),
            bottle: Some("no".to_string()),
            wheelchair: Some("limited".to_string()),
            ..Default::default()
        };
        assert_eq!(extract_description(&tags), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_explicit_description_wins() {
        let fountains = parse(
            r#"{"elements": [{"id": 555, "lat": 51.5074, "lon": -0.1278,
                "tags": {"amenity": "drinking_water", "name": "Hyde Park Fountain", "wheelchair": "yes",
                         "bottle": "yes", "operator": "Thames Water", "description": "Historic fountain"}}]}"#,
        );
        let f = &fountains[0];
        assert_eq!(f.description, "Historic fountain");
        assert!(f.accessibility.wheelchair_accessible);
        assert_eq!(f.fountain_type, FountainType::BottleFiller);
    }

    #[test]
    fn test_tag_metadata_mapping() {
        let fountains = parse(
            r#"{"elements": [{"id": 7, "lat": 48.8566, "lon": 2.3522,
                "tags": {"amenity": "water_point", "indoor": "yes",
                         "addr:housenumber": "12", "addr:street": "Rue de Rivoli", "addr:city": "Paris"}}]}"#,
        );
        let f = &fountains[0];
        assert_eq!(f.category, Category::WaterStation);
        assert_eq!(f.address.as_deref(), Some("12 Rue de Rivoli, Paris"));
        assert_eq!(f.amenities, vec![Amenity::Indoor]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let fountains = parse(
            r#"{"elements": [
                {"id": 1, "lat": 1.0, "lon": 1.0, "tags": {"name": "First"}},
                {"id": 1, "lat": 2.0, "lon": 2.0, "tags": {"name": "Second"}}
            ]}"#,
        );
        assert_eq!(fountains.len(), 1);
        assert_eq!(fountains[0].name, "First");
    }

    #[test]
    fn test_empty_elements() {
        assert!(parse(r#"{"elements": []}"#).is_empty());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = parse_response(b"{ invalid json }").unwrap_err();
        assert!(matches!(err, FountainError::Parse(_)));
    }

    #[test]
    fn test_missing_elements_is_parse_error() {
        let err = parse_response(br#"{"version": 0.6}"#).unwrap_err();
        assert!(matches!(err, FountainError::Parse(_)));
    }
}
