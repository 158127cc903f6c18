//! Catalog file I/O: the source program list and the optional
//! embeddings-augmented artifact that lets reruns skip the provider calls.

use crate::types::{EmbeddedProgram, Program};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read the source catalog (an array of program records).
pub fn load_programs(path: &Path) -> Result<Vec<Program>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    let programs: Vec<Program> =
        serde_json::from_str(&raw).with_context(|| format!("parsing catalog {}", path.display()))?;
    Ok(programs)
}

/// Read a previously persisted embeddings artifact.
pub fn load_embedded(path: &Path) -> Result<Vec<EmbeddedProgram>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading embeddings artifact {}", path.display()))?;
    let embedded: Vec<EmbeddedProgram> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing embeddings artifact {}", path.display()))?;
    Ok(embedded)
}

/// Persist the embeddings-augmented catalog next to the source file.
pub fn save_embedded(path: &Path, embedded: &[EmbeddedProgram]) -> Result<()> {
    let raw = serde_json::to_string_pretty(embedded)?;
    fs::write(path, raw).with_context(|| format!("writing embeddings artifact {}", path.display()))
}
