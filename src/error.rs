use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading the history entry failed or returned data that does not parse.
    /// `HistoryStore::list` recovers from this and yields an empty history.
    #[error("failed to read {key}: {reason}")]
    PersistenceReadFailed { key: String, reason: String },

    #[error("failed to write {key}: {reason}")]
    PersistenceWriteFailed { key: String, reason: String },

    #[error("scan record {0} already exists")]
    DuplicateId(String),

    #[error("failed to copy {from} into the image archive: {source}")]
    ImageCopyFailed {
        from: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no share mechanism available for {0}")]
    ShareUnavailable(PathBuf),

    #[error("unable to open maps (tried {tried:?})")]
    MapsIntentUnsupported { tried: Vec<String> },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
