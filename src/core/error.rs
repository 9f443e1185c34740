use thiserror::Error;

/// Errors surfaced by the engine's parsing and settings boundaries.
///
/// The simulation itself has no failure modes; everything here comes from
/// turning outside text (tab identifiers, settings documents) into typed values.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown tab identifier: {0:?}")]
    UnknownTab(String),

    #[error("invalid settings document: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("settings i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
