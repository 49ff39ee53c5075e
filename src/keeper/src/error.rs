//! Error types for the segment keeper pipeline.
//!
//! Every variant is fatal for the run: the pipeline performs no retries and
//! stops at the first failure it encounters.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeeperError>;

#[derive(Error, Debug)]
pub enum KeeperError {
    /// The bucket listing reported an error for one of its entries
    #[error("Failed to list objects: {0}")]
    Listing(#[source] object_store::Error),

    #[error("Failed to read manifest {path}: {source}")]
    ManifestFetch {
        path: String,
        #[source]
        source: object_store::Error,
    },

    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize manifest {path}: {source}")]
    ManifestEncode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to upload manifest {path}: {source}")]
    ManifestUpload {
        path: String,
        #[source]
        source: object_store::Error,
    },

    #[error("Failed to delete segment object {path}: {source}")]
    DeleteObject {
        path: String,
        #[source]
        source: object_store::Error,
    },

    /// The admin API could not be reached or rejected the request
    #[error("Failed to synchronize local state for {topic}/{partition}: {message}")]
    AdminSync {
        topic: String,
        partition: i32,
        message: String,
    },

    #[error("Failed to build admin client: {0}")]
    AdminClient(#[source] reqwest::Error),
}
