//! Error types for nrtk-sync.

use std::path::PathBuf;

use thiserror::Error;

use nrtk_renderer::RenderError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The feed payload is not valid JSON for the expected shape.
    #[error("failed to parse feed payload: {0}")]
    Parse(#[source] serde_json::Error),

    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored metadata record could not be decoded.
    #[error("corrupt metadata at {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (metadata record).
    #[error("metadata JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A story anchor cannot be used as a file name.
    #[error("invalid anchor '{anchor}' for story '{uid}'")]
    InvalidAnchor { uid: String, anchor: String },

    /// The current record was not replaced because its archive failed.
    #[error("kept current metadata {checksum}: it could not be archived")]
    ArchivePending { checksum: String },

    /// Another sync holds the lock file.
    #[error("another sync is running (lock held at {path}); remove it if no sync is active")]
    Locked { path: PathBuf },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
