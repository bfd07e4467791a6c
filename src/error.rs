use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the per-file pipeline and of output directory maintenance.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Inference failed: {0}")]
    Inference(#[source] anyhow::Error),

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to delete {name}: {source}")]
    Cleanup {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Background task failed: {0}")]
    Task(String),
}
