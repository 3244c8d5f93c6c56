//! Error types for the broadcaster.

use brief_core::StoreError;
use thiserror::Error;

/// Fatal errors that abort a send run.
///
/// Per-recipient delivery failures are counted in the report, not raised.
#[derive(Debug, Error)]
pub enum SendError {
    /// The brief repository or subscriber directory could not be read or updated.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

/// Convenience type alias.
pub type Result<T> = std::result::Result<T, SendError>;
