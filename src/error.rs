use crate::default_miner::MinerError;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while turning a manifest into a document
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A documentation comment carries an example value that does not fit its property type.
    #[error(transparent)]
    Documentation(#[from] MinerError),
}

