//! Canonical-result extraction shared by all three backend normalizers.
//!
//! Each backend returns its payload fields as a JSON object (Qdrant point
//! payload, Elasticsearch `_source`, Typesense `document`). The per-hit
//! mapping into [`SearchResult`] is identical once the envelope is peeled
//! off, so it lives here.

use crate::error::{Error, Result};
use crate::types::SearchResult;
use serde_json::{Map, Value};

/// Extract a required string field, failing with `MalformedResponse` when it
/// is absent or not a string. A missing field means ingestion and schema are
/// out of sync, which must surface immediately rather than default silently.
pub fn require_str(
    backend: &'static str,
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<String> {
    fields
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(Error::MalformedResponse { backend, field })
}

/// Build one canonical result from a hit's payload object plus its native
/// score. The score is carried through unmodified in sign and scale.
pub fn result_from_fields(
    backend: &'static str,
    fields: &Map<String, Value>,
    score: f32,
) -> Result<SearchResult> {
    Ok(SearchResult {
        title: require_str(backend, fields, "title")?,
        short_description: require_str(backend, fields, "shortDescription")?,
        description: require_str(backend, fields, "description")?,
        image: require_str(backend, fields, "image")?,
        url: require_str(backend, fields, "url")?,
        score,
    })
}
