use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("no valid Vietnamese words left after filtering, cannot sample")]
    EmptyDistribution,

    #[error("corpus contains no Vietnamese characters")]
    EmptyCorpus,

    #[error("Unsupported n-gram length: {0}")]
    UnsupportedNgramLength(usize),

    #[error("malformed frequency document {}: {reason}", .path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Maps a failed open into `MissingInput` when the file is absent.
    pub(crate) fn from_open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            PipelineError::MissingInput(path)
        } else {
            PipelineError::Io { path, source }
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
