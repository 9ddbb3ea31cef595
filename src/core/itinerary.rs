use crate::core::ranking::{interests_query, rank_locations, DEFAULT_TOP_K};
use crate::core::{Itinerary, LocationIndex, RankedLocation};
use crate::domain::model::ItineraryDay;
use crate::domain::preferences::Preferences;
use crate::utils::error::Result;
use std::fmt;

pub const DEFAULT_DAYS: u32 = 5;
pub const DEFAULT_MAX_DAYS: u32 = 30;

pub const NEED_INTERESTS: &str = "Please provide your interests before generating an itinerary.";
pub const NO_MATCHES: &str = "I couldn't find enough locations matching your interests.";
pub const INVALID_DAYS: &str = "Please choose a trip length of at least one day.";

#[derive(Debug, Clone, PartialEq)]
pub enum ItineraryOutcome {
    Planned(Itinerary),
    NeedsInterests,
    NoMatches,
    InvalidDays,
}

impl fmt::Display for ItineraryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItineraryOutcome::Planned(itinerary) => fmt::Display::fmt(itinerary, f),
            ItineraryOutcome::NeedsInterests => f.write_str(NEED_INTERESTS),
            ItineraryOutcome::NoMatches => f.write_str(NO_MATCHES),
            ItineraryOutcome::InvalidDays => f.write_str(INVALID_DAYS),
        }
    }
}

/// Assigns the i-th ranked place to day `i % days`. Every day appears in the
/// result, empty or not.
pub fn distribute(places: Vec<RankedLocation>, days: u32, travel_dates: &str) -> Itinerary {
    let days = days.max(1) as usize;
    let mut buckets: Vec<ItineraryDay> = (1..=days)
        .map(|n| ItineraryDay {
            label: format!("Day {}", n),
            places: Vec::new(),
        })
        .collect();

    for (i, place) in places.into_iter().enumerate() {
        buckets[i % days].places.push(place);
    }

    Itinerary {
        travel_dates: travel_dates.to_string(),
        days: buckets,
    }
}

#[derive(Debug, Clone)]
pub struct ItineraryBuilder {
    top_k: usize,
    max_days: u32,
}

impl Default for ItineraryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K, DEFAULT_MAX_DAYS)
    }
}

impl ItineraryBuilder {
    pub fn new(top_k: usize, max_days: u32) -> Self {
        Self {
            top_k,
            max_days: max_days.max(1),
        }
    }

    /// Plans a trip from the stored interests. Missing input is answered
    /// with a prompt, never an error; only index failures propagate.
    pub async fn plan(
        &self,
        index: &dyn LocationIndex,
        preferences: &Preferences,
        days: u32,
    ) -> Result<ItineraryOutcome> {
        if days == 0 {
            return Ok(ItineraryOutcome::InvalidDays);
        }
        let Some(query) = interests_query(preferences.interests()) else {
            return Ok(ItineraryOutcome::NeedsInterests);
        };

        let days = if days > self.max_days {
            tracing::debug!("Clamping itinerary from {} to {} days", days, self.max_days);
            self.max_days
        } else {
            days
        };

        let ranked = rank_locations(index, &query, self.top_k).await?;
        if ranked.is_empty() {
            return Ok(ItineraryOutcome::NoMatches);
        }

        let travel_dates = preferences.travel_dates().unwrap_or("upcoming trip");
        tracing::info!("Planned {} places over {} days", ranked.len(), days);
        Ok(ItineraryOutcome::Planned(distribute(ranked, days, travel_dates)))
    }
}
