use brief_core::StoreError;
use thiserror::Error;

/// Errors that can occur while building a brief.
#[derive(Debug, Error)]
pub enum BuildError {
    /// One program's data could not be read. The build continues without it.
    #[error("aggregation failed for program {program}: {source}")]
    Aggregation {
        program: String,
        #[source]
        source: StoreError,
    },

    /// The brief repository could not be read or written. Fatal for the run.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}
