use std::io;

use thiserror::Error;

use dcc_core::config::ConfigError;
use dcc_core::data::DataStoreError;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    /// The worker thread is gone; no more requests can be served.
    #[error("worker disconnected")]
    Disconnected,

    #[error("malformed message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    DataStore(#[from] DataStoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
