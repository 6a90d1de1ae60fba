use std::io;

use thiserror::Error;

use crate::processor::ProcessError;

/// Errors that abort the transformation of a file.
///
/// In lenient mode only [`TransformError::Splice`] and the setup variants can
/// surface; load and process failures are reported as diagnostics instead.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid plugin options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("invalid extension matcher: {0}")]
    Config(String),

    #[error("failed to load `{path}`: {source}")]
    Load {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("failed to parse `{filename}`: {message}")]
    Parse { filename: String, message: String },

    #[error("generated code is not a valid expression: {0:#}")]
    Splice(anyhow::Error),

    #[error("failed to print transformed code: {0}")]
    Emit(#[source] io::Error),
}
