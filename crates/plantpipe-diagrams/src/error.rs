//! Pipeline error type.

use std::path::{Path, PathBuf};

use crate::codec::{DecodeError, IntegrityError};
use crate::fetch::FetchError;
use crate::process::InvocationError;

/// Error from any pipeline step.
///
/// No step recovers from another step's failure; the first error ends the run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Encoded payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Encode/decode round trip did not reproduce the source.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// The external renderer could not be run.
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// The renderer ran but reported problems in its text output.
    #[error("PlantUML ASCII rendering contains errors. See {}", .path.display())]
    RenderValidation {
        /// Persisted text output, kept for inspection.
        path: PathBuf,
    },

    /// A rendering could not be downloaded.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Reading, writing or creating a path failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Wrap an I/O error with the path it happened on.
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
