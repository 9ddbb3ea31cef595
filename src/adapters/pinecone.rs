//! Pinecone-backed location index. Queries are embedded with the injected
//! `Embedder` and sent to the index's data plane host.

use crate::adapters::http::{build_client, ensure_success, join_url};
use crate::domain::model::{LocationCandidate, ScoredLocation};
use crate::domain::ports::{Embedder, LocationIndex};
use crate::utils::error::{Result, TravelError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CONTROL_URL: &str = "https://api.pinecone.io";
pub const DEFAULT_INDEX_NAME: &str = "puerto-rico-travel";
const API_VERSION: &str = "2024-07";

#[derive(Debug, Clone)]
pub struct PineconeSettings {
    pub control_url: String,
    pub index_name: String,
    pub namespace: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for PineconeSettings {
    fn default() -> Self {
        Self {
            control_url: DEFAULT_CONTROL_URL.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            namespace: None,
            timeout: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

pub struct PineconeIndex {
    http: Client,
    host: String,
    api_key: SecretString,
    namespace: Option<String>,
    embedder: Arc<dyn Embedder>,
}

fn with_headers(request: RequestBuilder, api_key: &SecretString) -> RequestBuilder {
    request
        .header("Api-Key", api_key.expose_secret())
        .header("X-Pinecone-API-Version", API_VERSION)
}

impl PineconeIndex {
    /// Resolves the index host through the control plane. A missing index is
    /// a setup error and is returned as `IndexNotFound`.
    pub async fn connect(
        settings: &PineconeSettings,
        api_key: SecretString,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let http = build_client(settings.timeout)?;
        let url = join_url(
            &settings.control_url,
            &format!("indexes/{}", settings.index_name),
        );

        tracing::info!("Connecting to vector index '{}'", settings.index_name);
        let response = with_headers(http.get(&url), &api_key).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TravelError::IndexNotFound {
                index_name: settings.index_name.clone(),
            });
        }
        let description: IndexDescription =
            ensure_success("pinecone", response).await?.json().await?;

        let has_scheme =
            description.host.starts_with("http://") || description.host.starts_with("https://");
        let host = if has_scheme {
            description.host
        } else {
            format!("https://{}", description.host)
        };
        tracing::debug!("Index host resolved to {}", host);

        Ok(Self {
            http,
            host,
            api_key,
            namespace: settings.namespace.clone(),
            embedder,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl LocationIndex for PineconeIndex {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<ScoredLocation>> {
        let vector = self.embedder.embed(query).await?;

        let mut body = json!({
            "vector": vector,
            "topK": k,
            "includeMetadata": true,
        });
        if let Some(namespace) = &self.namespace {
            body["namespace"] = json!(namespace);
        }

        let request = self.http.post(join_url(&self.host, "query")).json(&body);
        let response = with_headers(request, &self.api_key).send().await?;
        let response: QueryResponse = ensure_success("pinecone", response).await?.json().await?;

        Ok(response
            .matches
            .into_iter()
            .take(k)
            .map(|m| ScoredLocation {
                candidate: LocationCandidate::from_metadata(&m.metadata.unwrap_or_default()),
                score: m.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.5, 0.25])
        }
    }

    #[tokio::test]
    async fn test_missing_index_is_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/indexes/puerto-rico-travel");
            then.status(404).body("{\"error\":{\"code\":\"NOT_FOUND\"}}");
        });

        let settings = PineconeSettings {
            control_url: server.base_url(),
            ..PineconeSettings::default()
        };
        let result = PineconeIndex::connect(
            &settings,
            SecretString::from("pc-key".to_string()),
            Arc::new(FixedEmbedder),
        )
        .await;

        assert!(matches!(
            result,
            Err(TravelError::IndexNotFound { ref index_name }) if index_name == "puerto-rico-travel"
        ));
    }

    #[tokio::test]
    async fn test_query_sends_namespace_and_tolerates_missing_metadata() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/indexes/pr-locations");
            then.status(200)
                .json_body(serde_json::json!({"host": server.base_url()}));
        });
        let query = server.mock(|when, then| {
            when.method(POST)
                .path("/query")
                .header("Api-Key", "pc-key")
                .json_body(serde_json::json!({
                    "vector": [0.5, 0.25],
                    "topK": 2,
                    "includeMetadata": true,
                    "namespace": "towns"
                }));
            then.status(200).json_body(serde_json::json!({
                "matches": [
                    {"id": "a", "score": 0.8, "metadata": {"name": "Ponce", "rating": 4.4}},
                    {"id": "b", "score": 0.7}
                ]
            }));
        });

        let settings = PineconeSettings {
            control_url: server.base_url(),
            index_name: "pr-locations".to_string(),
            namespace: Some("towns".to_string()),
            timeout: None,
        };
        let index = PineconeIndex::connect(
            &settings,
            SecretString::from("pc-key".to_string()),
            Arc::new(FixedEmbedder),
        )
        .await
        .unwrap();

        assert_eq!(index.host(), server.base_url());
        let results = index.similarity_search("southern towns", 2).await.unwrap();

        query.assert();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].candidate.name, "Ponce");
        assert_eq!(results[0].candidate.rating, Some(4.4));
        assert_eq!(results[1].candidate.name, "");
        assert_eq!(results[1].candidate.rating, None);
    }
}
