//! Qdrant backend: REST client, request builder, and response normalizer.
//!
//! Search goes through `POST /collections/{name}/points/query` with the raw
//! query vector; the collection is created with cosine distance, so the
//! returned `score` is a cosine similarity (higher is better).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use trisearch_core::error::{Error, Result};
use trisearch_core::response::result_from_fields;
use trisearch_core::traits::SearchBackend;
use trisearch_core::types::{IndexedDocument, SearchResult, StoredFields, COLLECTION_NAME, EMBEDDING_DIM};

pub const BACKEND_NAME: &str = "qdrant";

/// Body of a `points/query` call. `with_payload` asks for the full stored
/// fields back alongside each scored point.
#[derive(Debug, Serialize)]
pub struct QueryRequest {
    pub query: Vec<f32>,
    pub limit: usize,
    pub with_payload: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    result: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    points: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct UpsertPoints {
    points: Vec<Point>,
}

#[derive(Debug, Serialize)]
struct Point {
    id: String,
    vector: Vec<f32>,
    payload: StoredFields,
}

/// Single nearest-neighbor query over the full vector, capped at `limit`,
/// cosine metric implied by the collection config.
pub fn build_search_request(query_vector: &[f32], limit: usize) -> QueryRequest {
    QueryRequest { query: query_vector.to_vec(), limit, with_payload: true }
}

/// Collapse a query response into canonical results, preserving Qdrant's
/// ranking order. Any point missing a payload field fails the whole parse.
pub fn parse_search_response(raw: QueryResponse) -> Result<Vec<SearchResult>> {
    raw.result
        .points
        .iter()
        .map(|point| result_from_fields(BACKEND_NAME, &point.payload, point.score))
        .collect()
}

pub struct QdrantBackend {
    http: reqwest::Client,
    base_url: String,
}

impl QdrantBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, COLLECTION_NAME)
    }

    fn transport(e: reqwest::Error) -> Error {
        Error::unavailable(BACKEND_NAME, e)
    }
}

#[async_trait]
impl SearchBackend for QdrantBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn reload(&self, docs: &[IndexedDocument]) -> Result<usize> {
        // Delete any existing collection; a 404 just means nothing to drop.
        let deleted = self
            .http
            .delete(self.collection_url())
            .send()
            .await
            .map_err(Self::transport)?;
        tracing::debug!(status = %deleted.status(), "dropped qdrant collection");

        let create = json!({
            "vectors": { "size": EMBEDDING_DIM, "distance": "Cosine" }
        });
        let response = self
            .http
            .put(self.collection_url())
            .json(&create)
            .send()
            .await
            .map_err(|e| Error::schema_setup(BACKEND_NAME, e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::schema_setup(BACKEND_NAME, format!("{status}: {body}")));
        }

        let points = docs
            .iter()
            .map(|doc| Point {
                id: doc.id.clone(),
                vector: doc.embedding.clone(),
                payload: StoredFields::from(&doc.program),
            })
            .collect();
        let response = self
            .http
            .put(format!("{}/points?wait=true", self.collection_url()))
            .json(&UpsertPoints { points })
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::unavailable(BACKEND_NAME, format!("upsert failed: {status}: {body}")));
        }
        tracing::info!(count = docs.len(), "qdrant reload complete");
        Ok(docs.len())
    }

    async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let request = build_search_request(query_vector, limit);
        let response = self
            .http
            .post(format!("{}/points/query", self.collection_url()))
            .json(&request)
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::unavailable(BACKEND_NAME, format!("{status}: {body}")));
        }
        let raw: QueryResponse = response
            .json()
            .await
            .map_err(|_| Error::MalformedResponse { backend: BACKEND_NAME, field: "result.points" })?;
        parse_search_response(raw)
    }
}
