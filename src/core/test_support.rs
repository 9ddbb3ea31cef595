use crate::core::LocationIndex;
use crate::domain::model::{LocationCandidate, ScoredLocation};
use crate::utils::error::{Result, TravelError};
use async_trait::async_trait;
use std::sync::Mutex;

pub fn candidate(name: &str, rating: Option<f64>, review_count: Option<f64>) -> ScoredLocation {
    ScoredLocation {
        candidate: LocationCandidate {
            name: name.to_string(),
            description: String::new(),
            rating,
            review_count,
            url: String::new(),
            contact: None,
        },
        score: 0.9,
    }
}

/// Index double that serves fixed results and records every query.
pub struct MockIndex {
    results: Vec<ScoredLocation>,
    fail: bool,
    calls: Mutex<Vec<(String, usize)>>,
}

impl MockIndex {
    pub fn new(results: Vec<ScoredLocation>) -> Self {
        Self {
            results,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocationIndex for MockIndex {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<ScoredLocation>> {
        self.calls.lock().unwrap().push((query.to_string(), k));
        if self.fail {
            return Err(TravelError::RemoteStatus {
                service: "pinecone".to_string(),
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.results.iter().take(k).cloned().collect())
    }
}
