use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The engine (or one of its collaborators) could not be brought up.
    /// No query can succeed on an instance that failed this way.
    #[error("Initialization failed: {0}")]
    Init(String),

    /// The similarity index itself failed while serving a query.
    #[error("Recommendation failed: {0}")]
    RecommendationFailed(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn init(err: impl std::fmt::Display) -> Self { Self::Init(err.to_string()) }

    /// True for errors that make the whole engine instance unusable.
    pub fn is_fatal(&self) -> bool { matches!(self, Self::Init(_) | Self::InvalidConfig(_)) }
}

pub type Result<T> = std::result::Result<T, Error>;
