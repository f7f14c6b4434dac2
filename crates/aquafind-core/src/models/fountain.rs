use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Name used when the source provides none.
pub const DEFAULT_FOUNTAIN_NAME: &str = "Drinking Fountain";

/// A fountain counts as verified if someone confirmed it within this many days.
const VERIFIED_WITHIN_DAYS: i64 = 30;

/// Kind of place a fountain belongs to. `All` is the list filter sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    All,
    #[serde(rename = "Drinking Fountain")]
    DrinkingFountain,
    #[serde(rename = "Water Station")]
    WaterStation,
    #[serde(rename = "Refill Station")]
    RefillStation,
    #[serde(rename = "Public Facility")]
    PublicFacility,
    Restaurant,
    Store,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::All,
        Category::DrinkingFountain,
        Category::WaterStation,
        Category::RefillStation,
        Category::PublicFacility,
        Category::Restaurant,
        Category::Store,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::DrinkingFountain => "Drinking Fountain",
            Category::WaterStation => "Water Station",
            Category::RefillStation => "Refill Station",
            Category::PublicFacility => "Public Facility",
            Category::Restaurant => "Restaurant",
            Category::Store => "Store",
        }
    }

    /// Parse a label or a loose CLI spelling ("water-station", "refill").
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "all" => Some(Category::All),
            "drinkingfountain" | "fountain" => Some(Category::DrinkingFountain),
            "waterstation" | "station" => Some(Category::WaterStation),
            "refillstation" | "refill" => Some(Category::RefillStation),
            "publicfacility" | "facility" => Some(Category::PublicFacility),
            "restaurant" => Some(Category::Restaurant),
            "store" => Some(Category::Store),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FountainType {
    #[default]
    Standard,
    #[serde(rename = "Bottle Filler")]
    BottleFiller,
    Combined,
    #[serde(rename = "Pet Friendly")]
    PetFriendly,
    Filtered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FountainStatus {
    #[default]
    Active,
    #[serde(rename = "Out of Order")]
    OutOfOrder,
    Removed,
    #[serde(rename = "Under Maintenance")]
    UnderMaintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Amenity {
    #[serde(rename = "Cold Water")]
    Cold,
    #[serde(rename = "Hot Water")]
    Hot,
    #[serde(rename = "Sparkling Water")]
    Sparkling,
    Indoor,
    Outdoor,
    #[serde(rename = "24/7 Access")]
    TwentyFourSeven,
    #[serde(rename = "Secure Location")]
    Secure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityFeatures {
    #[serde(default)]
    pub wheelchair_accessible: bool,
    #[serde(default)]
    pub low_height: bool,
    #[serde(default)]
    pub high_height: bool,
}

/// A normalized drinking-water location.
///
/// Records from the Overpass API carry the core fields and whatever metadata
/// the tags allowed us to infer. User-authored records may fill in the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fountain {
    pub id: String,
    pub name: String,
    pub coordinate: Coordinate,
    pub description: String,
    #[serde(default = "default_true")]
    pub is_operational: bool,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub fountain_type: FountainType,
    #[serde(default)]
    pub accessibility: AccessibilityFeatures,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rating_count: u32,
    #[serde(default)]
    pub status: FountainStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<Amenity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

fn default_category() -> Category {
    Category::DrinkingFountain
}

impl Fountain {
    /// A bare record with only the core fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinate,
            description: String::new(),
            is_operational: true,
            category: Category::DrinkingFountain,
            address: None,
            fountain_type: FountainType::default(),
            accessibility: AccessibilityFeatures::default(),
            rating: None,
            rating_count: 0,
            status: FountainStatus::default(),
            amenities: Vec::new(),
            added_by: None,
            date_added: None,
            last_verified: None,
        }
    }

    pub fn distance_from(&self, location: &Coordinate) -> f64 {
        location.distance_to(&self.coordinate)
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified_at(Utc::now())
    }

    pub fn is_verified_at(&self, now: DateTime<Utc>) -> bool {
        match self.last_verified {
            Some(verified) => now - verified <= Duration::days(VERIFIED_WITHIN_DAYS),
            None => false,
        }
    }

    pub fn formatted_rating(&self) -> String {
        match self.rating {
            Some(rating) => format!("{:.1}", rating),
            None => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fountain {
        Fountain::new("1", "Main Library Fountain", Coordinate::new(40.7128, -74.0060).unwrap())
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("all"), Some(Category::All));
        assert_eq!(Category::parse("Water Station"), Some(Category::WaterStation));
        assert_eq!(Category::parse("water-station"), Some(Category::WaterStation));
        assert_eq!(Category::parse("refill"), Some(Category::RefillStation));
        assert_eq!(Category::parse("swimming pool"), None);
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&Category::PublicFacility).unwrap();
        assert_eq!(json, "\"Public Facility\"");
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.label()));
        }
    }

    #[test]
    fn test_is_verified_within_thirty_days() {
        let now = Utc::now();
        let mut f = sample();
        assert!(!f.is_verified_at(now));

        f.last_verified = Some(now - Duration::days(10));
        assert!(f.is_verified_at(now));

        f.last_verified = Some(now - Duration::days(31));
        assert!(!f.is_verified_at(now));
    }

    #[test]
    fn test_formatted_rating() {
        let mut f = sample();
        assert_eq!(f.formatted_rating(), "-");
        f.rating = Some(4.5);
        assert_eq!(f.formatted_rating(), "4.5");
    }

    #[test]
    fn test_deserialize_minimal_record_uses_defaults() {
        let json = r#"{"id":"42","name":"Fountain","coordinate":{"latitude":1.0,"longitude":2.0},"description":"Public drinking water"}"#;
        let f: Fountain = serde_json::from_str(json).unwrap();
        assert!(f.is_operational);
        assert_eq!(f.category, Category::DrinkingFountain);
        assert_eq!(f.rating, None);
        assert!(f.amenities.is_empty());
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let mut f = sample();
        f.rating = Some(4.5);
        f.amenities = vec![Amenity::TwentyFourSeven];
        let value = serde_json::to_value(&f).unwrap();
        assert_eq!(value["isOperational"], true);
        assert_eq!(value["fountainType"], "Standard");
        assert_eq!(value["amenities"][0], "24/7 Access");
        assert!(value.get("addedBy").is_none());
    }
}
