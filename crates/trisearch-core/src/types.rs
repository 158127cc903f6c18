//! Domain types shared by the three backend crates and the CLI.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Collection/index name used by all three backends.
pub const COLLECTION_NAME: &str = "degree_programs";

/// Dimensionality of `text-embedding-ada-002` vectors. Every backend schema
/// declares this size; a vector of any other length is rejected at write time.
pub const EMBEDDING_DIM: usize = 1536;

/// One degree program as it appears in the source catalog
/// (`assets/programs.json`). Immutable once loaded.
///
/// `long_description` is the embedding input; `short_description` carries
/// HTML and is only ever displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub title: String,
    #[serde(rename = "shortDescription")]
    pub short_description: String,
    #[serde(rename = "longDescription")]
    pub long_description: String,
    #[serde(rename = "degreeImage")]
    pub image_url: String,
    #[serde(rename = "detailPage")]
    pub detail_path: String,
}

/// A catalog record paired with its embedding. This is the shape persisted to
/// the optional embeddings artifact so reruns can skip the provider calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedProgram {
    #[serde(flatten)]
    pub program: Program,
    pub embedding: Vec<f32>,
}

/// The stored unit in each backend: record + vector + a per-run random id.
///
/// Ids are not derived from a stable business key, so re-ingestion recreates
/// each collection from scratch rather than updating in place.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub id: String,
    pub program: Program,
    pub embedding: Vec<f32>,
}

impl IndexedDocument {
    pub fn with_random_id(embedded: EmbeddedProgram) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            program: embedded.program,
            embedding: embedded.embedding,
        }
    }
}

/// The five payload fields every backend stores alongside the vector, under
/// the exact field names the backends index them by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFields {
    pub title: String,
    #[serde(rename = "shortDescription")]
    pub short_description: String,
    pub description: String,
    pub image: String,
    pub url: String,
}

impl From<&Program> for StoredFields {
    fn from(p: &Program) -> Self {
        Self {
            title: p.title.clone(),
            short_description: p.short_description.clone(),
            description: p.long_description.clone(),
            image: p.image_url.clone(),
            url: p.detail_path.clone(),
        }
    }
}

/// The canonical, backend-agnostic result shape returned for display.
///
/// `score` is the backend's native number carried through unmodified: Qdrant
/// cosine similarity and Elasticsearch `_score` are higher-is-better,
/// Typesense `vector_distance` is lower-is-better. Scores are never
/// comparable across backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub image: String,
    pub url: String,
    pub score: f32,
}
