use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("scan directory does not exist: {}", .0.display())]
    ScanDir(PathBuf),

    #[error("malformed task spec {0:?}, expected \"ID:N\"")]
    TaskSpec(String),

    #[error("task id {id} out of range for {count} tasks")]
    InvalidTask { id: usize, count: usize },

    #[error("split size must be at least one event")]
    InvalidSplit,

    #[error("worker pool needs at least one worker")]
    InvalidPool,

    #[error("sample {0:?} already present in collection")]
    DuplicateSample(String),

    #[error("cannot count events in {}: {reason}", path.display())]
    EventCount { path: PathBuf, reason: String },

    #[error("Unsupported driver type: {0}")]
    UnsupportedDriver(String),

    #[error("submit directory already exists: {}", .0.display())]
    SubmitDirExists(PathBuf),

    #[error("{program} exited with {status}")]
    Launch { program: String, status: String },
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, QaError>;
