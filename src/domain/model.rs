use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const NO_DIRECTIONS: &str = "No directions available.";

/// A place stored in the travel knowledge base, read from vector metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub name: String,
    pub description: String,
    pub rating: Option<f64>,
    pub review_count: Option<f64>,
    pub url: String,
    /// JSON-encoded contact block, kept verbatim as stored.
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ContactInfo {
    google_maps_url: Option<String>,
}

impl LocationCandidate {
    /// Builds a candidate from index metadata. Missing or mistyped fields fall
    /// back to defaults instead of failing the lookup.
    pub fn from_metadata(metadata: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            metadata
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let contact = match metadata.get("contact") {
            Some(Value::String(raw)) => Some(raw.clone()),
            Some(Value::Object(obj)) => Some(Value::Object(obj.clone()).to_string()),
            _ => None,
        };

        Self {
            name: text("name"),
            description: text("description"),
            rating: metadata.get("rating").and_then(as_number),
            review_count: metadata.get("review_count").and_then(as_number),
            url: text("url"),
            contact,
        }
    }

    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    pub fn review_count_or_zero(&self) -> f64 {
        self.review_count.unwrap_or(0.0)
    }

    /// Maps link parsed out of the contact block.
    pub fn maps_link(&self) -> String {
        self.contact
            .as_deref()
            .and_then(|raw| serde_json::from_str::<ContactInfo>(raw).ok())
            .and_then(|info| info.google_maps_url)
            .filter(|link| !link.trim().is_empty())
            .unwrap_or_else(|| NO_DIRECTIONS.to_string())
    }
}

// Pinecone hands numbers back as floats; older uploads stored them as strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLocation {
    pub candidate: LocationCandidate,
    pub score: f32,
}

/// Reduced projection returned by ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLocation {
    pub name: String,
    pub rating: Option<f64>,
}

impl From<&LocationCandidate> for RankedLocation {
    fn from(candidate: &LocationCandidate) -> Self {
        Self {
            name: candidate.name.clone(),
            rating: candidate.rating,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryDay {
    pub label: String,
    pub places: Vec<RankedLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub travel_dates: String,
    pub days: Vec<ItineraryDay>,
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**Itinerary for {}**\n\n", self.travel_dates)?;
        for day in &self.days {
            writeln!(f, "**{}:**", day.label)?;
            for place in &day.places {
                writeln!(f, "  - {} (⭐ {})", place.name, format_optional(place.rating))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Whole numbers keep one decimal place, so a rating of 5 reads "5.0".
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

pub fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("metadata must be an object"),
        }
    }

    #[test]
    fn test_from_metadata_reads_all_fields() {
        let candidate = LocationCandidate::from_metadata(&metadata(json!({
            "name": "El Yunque",
            "description": "Tropical rainforest",
            "rating": 4.8,
            "review_count": 1200.0,
            "url": "https://example.com/yunque",
            "contact": "{\"google_maps_url\": \"https://maps.example.com/yunque\"}"
        })));

        assert_eq!(candidate.name, "El Yunque");
        assert_eq!(candidate.rating, Some(4.8));
        assert_eq!(candidate.review_count, Some(1200.0));
        assert_eq!(candidate.maps_link(), "https://maps.example.com/yunque");
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let candidate = LocationCandidate::from_metadata(&metadata(json!({
            "name": "Old San Juan",
            "rating": "4.5",
            "review_count": "300"
        })));

        assert_eq!(candidate.rating, Some(4.5));
        assert_eq!(candidate.review_count, Some(300.0));
    }

    #[test]
    fn test_maps_link_fails_soft() {
        let mut candidate = LocationCandidate::from_metadata(&metadata(json!({
            "name": "Flamenco Beach",
            "contact": "not json at all"
        })));
        assert_eq!(candidate.maps_link(), NO_DIRECTIONS);

        candidate.contact = Some("{\"phone\": \"787-555-0100\"}".to_string());
        assert_eq!(candidate.maps_link(), NO_DIRECTIONS);

        candidate.contact = None;
        assert_eq!(candidate.maps_link(), NO_DIRECTIONS);
    }

    #[test]
    fn test_itinerary_rendering() {
        let itinerary = Itinerary {
            travel_dates: "March 3-5".to_string(),
            days: vec![
                ItineraryDay {
                    label: "Day 1".to_string(),
                    places: vec![RankedLocation {
                        name: "El Yunque".to_string(),
                        rating: Some(4.5),
                    }],
                },
                ItineraryDay {
                    label: "Day 2".to_string(),
                    places: vec![],
                },
            ],
        };

        assert_eq!(
            itinerary.to_string(),
            "**Itinerary for March 3-5**\n\n**Day 1:**\n  - El Yunque (⭐ 4.5)\n\n**Day 2:**\n\n"
        );
    }

    #[test]
    fn test_whole_numbers_keep_a_decimal() {
        assert_eq!(format_number(5.0), "5.0");
        assert_eq!(format_number(4.75), "4.75");
        assert_eq!(format_optional(Some(1200.0)), "1200.0");
        assert_eq!(format_optional(None), "N/A");

        let itinerary = Itinerary {
            travel_dates: "May".to_string(),
            days: vec![ItineraryDay {
                label: "Day 1".to_string(),
                places: vec![RankedLocation {
                    name: "Bioluminescent Bay".to_string(),
                    rating: Some(5.0),
                }],
            }],
        };
        assert!(itinerary.to_string().contains("  - Bioluminescent Bay (⭐ 5.0)\n"));
    }
}
