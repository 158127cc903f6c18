use thiserror::Error;

/// Error kinds shared by the embedding provider and the three backends.
///
/// Query-time errors are caught at the CLI boundary and printed with the
/// failing backend's name; ingestion-time errors abort only the backend they
/// occurred on.
#[derive(Debug, Error)]
pub enum Error {
    #[error("embedding provider: {0}")]
    Provider(String),

    #[error("{backend} unavailable: {reason}")]
    BackendUnavailable { backend: &'static str, reason: String },

    #[error("{backend} response missing field `{field}`")]
    MalformedResponse { backend: &'static str, field: &'static str },

    #[error("{backend} schema setup failed: {reason}")]
    SchemaSetup { backend: &'static str, reason: String },
}

impl Error {
    pub fn unavailable(backend: &'static str, reason: impl ToString) -> Self {
        Self::BackendUnavailable { backend, reason: reason.to_string() }
    }

    pub fn schema_setup(backend: &'static str, reason: impl ToString) -> Self {
        Self::SchemaSetup { backend, reason: reason.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
