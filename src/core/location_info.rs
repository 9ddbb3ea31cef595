use crate::core::LocationIndex;
use crate::domain::model::{format_optional, LocationCandidate};
use crate::utils::error::Result;

pub const NOT_FOUND: &str = "No information found.";

pub fn describe(place: &LocationCandidate) -> String {
    format!(
        "{} - {} (Rating: {}, {} reviews). More info: {} Directions: {}",
        place.name,
        place.description,
        format_optional(place.rating),
        format_optional(place.review_count),
        place.url,
        place.maps_link()
    )
}

/// Looks up the single closest match for a free-text description.
pub async fn find_info_on_location(index: &dyn LocationIndex, location: &str) -> Result<String> {
    let results = index.similarity_search(location, 1).await?;

    match results.into_iter().next() {
        Some(best) => {
            tracing::debug!(
                "Best match for '{}': {} ({:.3})",
                location,
                best.candidate.name,
                best.score
            );
            Ok(describe(&best.candidate))
        }
        None => Ok(NOT_FOUND.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{candidate, MockIndex};

    #[tokio::test]
    async fn test_no_matches() {
        let index = MockIndex::new(vec![]);
        let info = find_info_on_location(&index, "Atlantis").await.unwrap();

        assert_eq!(info, NOT_FOUND);
        assert_eq!(index.calls(), vec![("Atlantis".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_formats_best_match() {
        let mut best = candidate("El Morro", Some(4.8), Some(15000.0));
        best.candidate.description = "16th-century citadel".to_string();
        best.candidate.url = "https://example.com/morro".to_string();
        best.candidate.contact =
            Some("{\"google_maps_url\": \"https://maps.example.com/morro\"}".to_string());
        let index = MockIndex::new(vec![best]);

        let info = find_info_on_location(&index, "old fort in San Juan").await.unwrap();

        assert_eq!(
            info,
            "El Morro - 16th-century citadel (Rating: 4.8, 15000.0 reviews). \
             More info: https://example.com/morro Directions: https://maps.example.com/morro"
        );
    }

    #[tokio::test]
    async fn test_missing_metadata_falls_back() {
        let index = MockIndex::new(vec![candidate("Cayo Icacos", None, None)]);
        let info = find_info_on_location(&index, "island").await.unwrap();

        assert!(info.contains("(Rating: N/A, N/A reviews)"));
        assert!(info.ends_with("Directions: No directions available."));
    }
}
