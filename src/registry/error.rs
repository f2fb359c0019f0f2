//! Registry errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::a2a::ClientError;

/// Errors reported by the agent registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The agent card could not be fetched.
    #[error("Failed to fetch agent card from {url}: {source}")]
    ManifestFetch {
        url: String,
        #[source]
        source: ClientError,
    },

    /// The agent card is missing or has a malformed required field.
    #[error("Invalid agent card: field '{field}' {reason}")]
    ManifestValidation { field: String, reason: String },

    /// Durable storage could not be read or written.
    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::ManifestValidation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Classify an error from the file layer.
    ///
    /// JSON failures arrive wrapped as `InvalidData`; they are unwrapped into
    /// `Serialization`. Everything else is a `Storage` error at `path`.
    pub(crate) fn from_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let is_json = source.kind() == std::io::ErrorKind::InvalidData
            && source
                .get_ref()
                .map_or(false, |inner| inner.is::<serde_json::Error>());
        if !is_json {
            return Self::storage(path, source);
        }
        match source.into_inner().map(|inner| inner.downcast::<serde_json::Error>()) {
            Some(Ok(json)) => Self::Serialization(*json),
            Some(Err(inner)) => Self::storage(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, inner),
            ),
            None => Self::storage(path, std::io::ErrorKind::InvalidData.into()),
        }
    }
}
