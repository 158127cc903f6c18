//! Embedding providers.
//!
//! `OpenAiEmbedder` wraps the OpenAI embeddings endpoint; `FakeEmbedder` is a
//! deterministic hash-based stand-in for tests and offline development,
//! selected with `APP_USE_FAKE_EMBEDDINGS=1`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trisearch_core::error::{Error, Result};
use trisearch_core::traits::Embedder;
use trisearch_core::types::EMBEDDING_DIM;

pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";
const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// One provider round trip per `embed` call; no retry or caching. The API key
/// comes from the `OPENAI_API_KEY` environment variable.
pub struct OpenAiEmbedder {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Provider("OPENAI_API_KEY is not set".to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Point at a different OpenAI-compatible endpoint (local inference
    /// servers expose the same route).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Pull the first vector out of a provider response and validate its length.
pub fn extract_embedding(response: EmbeddingResponse) -> Result<Vec<f32>> {
    let embedding = response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| Error::Provider("no embedding returned".to_string()))?;
    if embedding.len() != EMBEDDING_DIM {
        return Err(Error::Provider(format!(
            "expected {EMBEDDING_DIM}-dim vector, got {}",
            embedding.len()
        )));
    }
    Ok(embedding)
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn dim(&self) -> usize {
        EMBEDDING_DIM
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.endpoint);
        tracing::debug!(model = %self.model, chars = text.len(), "requesting embedding");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { input: text, model: &self.model })
            .send()
            .await
            .map_err(|e| Error::Provider(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!("{status}: {body}")));
        }
        let parsed: EmbeddingResponse =
            response.json().await.map_err(|e| Error::Provider(e.to_string()))?;
        extract_embedding(parsed)
    }
}

/// Deterministic token-hash embedder. Same construction as a bag-of-words
/// projection: each token bumps one bucket, then the vector is L2-normalized.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

/// Returns the fake embedder when `APP_USE_FAKE_EMBEDDINGS` is set, otherwise
/// the OpenAI provider.
pub fn default_embedder() -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        tracing::info!("using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(EMBEDDING_DIM)));
    }
    Ok(Box::new(OpenAiEmbedder::new()?))
}
