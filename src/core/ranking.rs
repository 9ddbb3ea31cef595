use crate::core::{LocationIndex, RankedLocation, ScoredLocation};
use crate::domain::model::LocationCandidate;
use crate::utils::error::Result;

pub const DEFAULT_TOP_K: usize = 5;

/// Query used when the traveller did not say what they are looking for.
pub fn interests_query(interests: &[String]) -> Option<String> {
    if interests.is_empty() {
        return None;
    }
    Some(format!(
        "Best places for {} in Puerto Rico",
        interests.join(", ")
    ))
}

/// Picks the explicit query when present, otherwise synthesizes one from
/// interests. `None` means there is nothing to search for.
pub fn resolve_query(query: Option<&str>, interests: &[String]) -> Option<String> {
    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => Some(q.to_string()),
        None => interests_query(interests),
    }
}

/// Orders candidates by rating then review count, both descending. Missing
/// values count as zero and ties keep retrieval order.
pub fn sort_by_rating(results: Vec<ScoredLocation>) -> Vec<LocationCandidate> {
    let mut candidates: Vec<LocationCandidate> =
        results.into_iter().map(|scored| scored.candidate).collect();

    candidates.sort_by(|a, b| {
        b.rating_or_zero()
            .total_cmp(&a.rating_or_zero())
            .then_with(|| b.review_count_or_zero().total_cmp(&a.review_count_or_zero()))
    });

    candidates
}

pub async fn rank_locations(
    index: &dyn LocationIndex,
    query: &str,
    top_k: usize,
) -> Result<Vec<RankedLocation>> {
    tracing::debug!("Ranking locations for query: {}", query);
    let results = index.similarity_search(query, top_k).await?;
    tracing::debug!("Index returned {} candidates", results.len());

    Ok(sort_by_rating(results)
        .iter()
        .map(RankedLocation::from)
        .collect())
}
