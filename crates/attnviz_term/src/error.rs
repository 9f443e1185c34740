use thiserror::Error;

#[derive(Debug, Error)]
pub enum TermError {
    #[error(transparent)]
    Engine(#[from] attnviz::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine the config directory")]
    NoConfigDir,

    #[error("{0}")]
    Usage(String),
}
