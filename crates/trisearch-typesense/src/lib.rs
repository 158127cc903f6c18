//! Typesense backend: multi-search with a string-encoded vector query.
//!
//! Typesense takes the query vector as a textual literal inside the
//! `vector_query` parameter, not as a structured array. The encoding uses
//! Rust's shortest-round-trip float formatting, so no precision is lost on
//! the way into the request. `vector_distance` is lower-is-better.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::Write as _;
use trisearch_core::error::{Error, Result};
use trisearch_core::response::result_from_fields;
use trisearch_core::traits::SearchBackend;
use trisearch_core::types::{IndexedDocument, SearchResult, StoredFields, COLLECTION_NAME, EMBEDDING_DIM};

pub const BACKEND_NAME: &str = "typesense";

const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

#[derive(Debug, Serialize)]
pub struct MultiSearchRequest {
    pub searches: Vec<SearchClause>,
}

/// One search against the collection: wildcard filter query plus the vector
/// clause, capped at `per_page` results.
#[derive(Debug, Serialize)]
pub struct SearchClause {
    pub collection: &'static str,
    pub q: &'static str,
    pub vector_query: String,
    pub per_page: usize,
}

#[derive(Debug, Deserialize)]
pub struct MultiSearchResponse {
    results: Vec<CollectionResult>,
}

#[derive(Debug, Deserialize)]
struct CollectionResult {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    document: Map<String, Value>,
    // Absent on rare hits; the original tool defaulted it to zero.
    #[serde(default)]
    vector_distance: f32,
}

#[derive(Debug, Serialize)]
struct TypesenseDocument {
    id: String,
    #[serde(flatten)]
    fields: StoredFields,
    embedding: Vec<f32>,
}

/// Serialize the query vector into the `vector_query` literal:
/// `embedding:([f1,f2,...], k:<limit>)`. `f32` `Display` prints the shortest
/// decimal that round-trips, so parsing the literal back yields the exact
/// input bits.
pub fn encode_vector_query(query_vector: &[f32], limit: usize) -> String {
    let mut joined = String::with_capacity(query_vector.len() * 10);
    for (i, v) in query_vector.iter().enumerate() {
        if i > 0 {
            joined.push(',');
        }
        let _ = write!(joined, "{v}");
    }
    format!("embedding:([{joined}], k:{limit})")
}

/// Multi-search request with the wildcard match-all filter and the
/// string-encoded vector clause, `k = limit`.
pub fn build_search_request(query_vector: &[f32], limit: usize) -> MultiSearchRequest {
    MultiSearchRequest {
        searches: vec![SearchClause {
            collection: COLLECTION_NAME,
            q: "*",
            vector_query: encode_vector_query(query_vector, limit),
            per_page: limit,
        }],
    }
}

/// Collapse the first collection's hits into canonical results. A response
/// with no `results` entry at all is malformed; an entry without `hits` is an
/// empty result.
pub fn parse_search_response(raw: MultiSearchResponse) -> Result<Vec<SearchResult>> {
    let first = raw
        .results
        .first()
        .ok_or(Error::MalformedResponse { backend: BACKEND_NAME, field: "results" })?;
    first
        .hits
        .iter()
        .map(|hit| result_from_fields(BACKEND_NAME, &hit.document, hit.vector_distance))
        .collect()
}

pub struct TypesenseBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TypesenseBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into(), api_key: api_key.into() }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, COLLECTION_NAME)
    }

    fn transport(e: reqwest::Error) -> Error {
        Error::unavailable(BACKEND_NAME, e)
    }
}

#[async_trait]
impl SearchBackend for TypesenseBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn reload(&self, docs: &[IndexedDocument]) -> Result<usize> {
        // Delete any existing collection; 404 means nothing to drop.
        let deleted = self
            .http
            .delete(self.collection_url())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(Self::transport)?;
        tracing::debug!(status = %deleted.status(), "dropped typesense collection");

        let schema = json!({
            "name": COLLECTION_NAME,
            "fields": [
                { "name": "title", "type": "string" },
                { "name": "shortDescription", "type": "string" },
                { "name": "description", "type": "string" },
                { "name": "image", "type": "string" },
                { "name": "url", "type": "string" },
                { "name": "embedding", "type": "float[]", "num_dim": EMBEDDING_DIM }
            ]
        });
        let response = self
            .http
            .post(format!("{}/collections", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&schema)
            .send()
            .await
            .map_err(|e| Error::schema_setup(BACKEND_NAME, e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::schema_setup(BACKEND_NAME, format!("{status}: {body}")));
        }

        for doc in docs {
            let body = TypesenseDocument {
                id: doc.id.clone(),
                fields: StoredFields::from(&doc.program),
                embedding: doc.embedding.clone(),
            };
            let response = self
                .http
                .post(format!("{}/documents", self.collection_url()))
                .header(API_KEY_HEADER, &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(Self::transport)?;
            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                return Err(Error::unavailable(
                    BACKEND_NAME,
                    format!("creating document {} failed: {status}: {text}", doc.id),
                ));
            }
        }
        tracing::info!(count = docs.len(), "typesense reload complete");
        Ok(docs.len())
    }

    async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        // multi_search is a POST, so the large vector literal rides in the
        // body instead of the URL.
        let request = build_search_request(query_vector, limit);
        let response = self
            .http
            .post(format!("{}/multi_search", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::unavailable(BACKEND_NAME, format!("{status}: {body}")));
        }
        let raw: MultiSearchResponse = response
            .json()
            .await
            .map_err(|_| Error::MalformedResponse { backend: BACKEND_NAME, field: "results" })?;
        parse_search_response(raw)
    }
}
