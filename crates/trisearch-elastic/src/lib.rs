//! Elasticsearch backend: k-NN search over a `dense_vector` mapping.
//!
//! The knn clause over-fetches `NUM_CANDIDATES` per shard regardless of `k`;
//! the returned hit count is still capped at `k`. `_source` is restricted to
//! the five stored fields. `_score` is higher-is-better.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use trisearch_core::error::{Error, Result};
use trisearch_core::response::result_from_fields;
use trisearch_core::traits::SearchBackend;
use trisearch_core::types::{IndexedDocument, SearchResult, StoredFields, COLLECTION_NAME, EMBEDDING_DIM};

pub const BACKEND_NAME: &str = "elasticsearch";

/// Candidate over-fetch for the knn clause, independent of the result limit.
pub const NUM_CANDIDATES: usize = 100;

const SOURCE_FIELDS: [&str; 5] = ["title", "description", "shortDescription", "image", "url"];

#[derive(Debug, Serialize)]
pub struct SearchRequest {
    pub knn: KnnClause,
    #[serde(rename = "_source")]
    pub source: [&'static str; 5],
}

#[derive(Debug, Serialize)]
pub struct KnnClause {
    pub field: &'static str,
    pub query_vector: Vec<f32>,
    pub k: usize,
    pub num_candidates: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_score")]
    score: f32,
    #[serde(rename = "_source", default)]
    source: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct EsDocument {
    #[serde(flatten)]
    fields: StoredFields,
    embedding: Vec<f32>,
}

/// k-NN clause embedded in a structured query body, projecting only the
/// named source fields.
pub fn build_search_request(query_vector: &[f32], limit: usize) -> SearchRequest {
    SearchRequest {
        knn: KnnClause {
            field: "embedding",
            query_vector: query_vector.to_vec(),
            k: limit,
            num_candidates: NUM_CANDIDATES,
        },
        source: SOURCE_FIELDS,
    }
}

/// Collapse `hits.hits` into canonical results. An empty hit list is a valid
/// empty result, not an error.
pub fn parse_search_response(raw: SearchResponse) -> Result<Vec<SearchResult>> {
    raw.hits
        .hits
        .iter()
        .map(|hit| result_from_fields(BACKEND_NAME, &hit.source, hit.score))
        .collect()
}

pub struct ElasticsearchBackend {
    http: reqwest::Client,
    base_url: String,
}

impl ElasticsearchBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, COLLECTION_NAME)
    }

    fn transport(e: reqwest::Error) -> Error {
        Error::unavailable(BACKEND_NAME, e)
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn reload(&self, docs: &[IndexedDocument]) -> Result<usize> {
        // Delete the index if present; 404 means it was never created.
        let deleted = self
            .http
            .delete(self.index_url())
            .send()
            .await
            .map_err(Self::transport)?;
        tracing::debug!(status = %deleted.status(), "dropped elasticsearch index");

        let mapping = json!({
            "mappings": {
                "properties": {
                    "title": { "type": "text" },
                    "shortDescription": { "type": "text" },
                    "description": { "type": "text" },
                    "image": { "type": "keyword" },
                    "url": { "type": "keyword" },
                    "embedding": {
                        "type": "dense_vector",
                        "dims": EMBEDDING_DIM,
                        "index": true,
                        "similarity": "cosine"
                    }
                }
            }
        });
        let response = self
            .http
            .put(self.index_url())
            .json(&mapping)
            .send()
            .await
            .map_err(|e| Error::schema_setup(BACKEND_NAME, e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::schema_setup(BACKEND_NAME, format!("{status}: {body}")));
        }

        for doc in docs {
            let body = EsDocument {
                fields: StoredFields::from(&doc.program),
                embedding: doc.embedding.clone(),
            };
            let response = self
                .http
                .put(format!("{}/_doc/{}", self.index_url(), doc.id))
                .json(&body)
                .send()
                .await
                .map_err(Self::transport)?;
            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                return Err(Error::unavailable(
                    BACKEND_NAME,
                    format!("indexing document {} failed: {status}: {text}", doc.id),
                ));
            }
        }

        // Make documents searchable immediately.
        self.http
            .post(format!("{}/_refresh", self.index_url()))
            .send()
            .await
            .map_err(Self::transport)?;
        tracing::info!(count = docs.len(), "elasticsearch reload complete");
        Ok(docs.len())
    }

    async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let request = build_search_request(query_vector, limit);
        let response = self
            .http
            .post(format!("{}/_search", self.index_url()))
            .json(&request)
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::unavailable(BACKEND_NAME, format!("{status}: {body}")));
        }
        let raw: SearchResponse = response
            .json()
            .await
            .map_err(|_| Error::MalformedResponse { backend: BACKEND_NAME, field: "hits.hits" })?;
        parse_search_response(raw)
    }
}
