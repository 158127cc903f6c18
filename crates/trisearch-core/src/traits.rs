use crate::error::Result;
use crate::types::{IndexedDocument, SearchResult};
use async_trait::async_trait;

/// Text -> fixed-length vector, one provider round trip per call.
///
/// No retry, batching, or caching: repeated query strings re-embed every
/// time. Ingestion therefore calls this exactly once per record and shares
/// the vector across all three backends.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// One vector/search backend: schema lifecycle plus nearest-neighbor query.
///
/// Implementations are read-only on the query path, so a single instance can
/// be shared across concurrent queries without coordination.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Stable lowercase engine name used in errors and the CLI selector.
    fn name(&self) -> &'static str;

    /// Drop any existing collection (404 tolerated), recreate it with an
    /// explicit 1536-dim cosine schema, and bulk-insert `docs`. Returns the
    /// inserted count. A creation failure aborts this backend only.
    async fn reload(&self, docs: &[IndexedDocument]) -> Result<usize>;

    /// Nearest-neighbor search, at most `limit` hits, in the backend's
    /// native ranking order.
    async fn search(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchResult>>;
}
