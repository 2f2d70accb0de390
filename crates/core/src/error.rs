use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot parse error: {0}")]
    SnapshotParse(#[from] serde_json::Error),
}
