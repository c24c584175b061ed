use thiserror::Error;

pub type Result<T> = std::result::Result<T, TeambuilderError>;

/// Errors surfaced by the persistence layer.
///
/// Every failure is recoverable by the caller; presentation
/// (dialogs, prompts) is a concern of the embedding client.
#[derive(Error, Debug)]
pub enum TeambuilderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {msg} (line {line}, col {col})")]
    Parse {
        msg: String,
        line: usize,
        col: usize,
    },
    #[error("schema error: {0}")]
    Schema(String),
    /// The document is well-formed but declares a schema version
    /// newer than this build understands. Distinct from `Parse`:
    /// the bytes are fine, the client is outdated.
    #[error("document version {found} is newer than supported version {supported}")]
    Version { found: i32, supported: i32 },
    #[error("file is currently in use: {0}")]
    InUse(String),
    #[error("team index out of range: {0}")]
    Index(usize),
    #[error("missing setting: {0}")]
    Settings(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for TeambuilderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            msg: e.to_string(),
            line: e.line(),
            col: e.column(),
        }
    }
}
