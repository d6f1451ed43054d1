use std::path::PathBuf;

use homevertex_core::ModelError;
use thiserror::Error;

/// Errors a service call surfaces to its caller.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(
        "Cannot read `{}`, no access to path; `allowlist_external_dirs` may need to be adjusted in `configuration.yaml`",
        .0.display()
    )]
    PathNotAllowed(PathBuf),

    #[error("`{}` does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("`{}` is not an image", .0.display())]
    NotAnImage(PathBuf),

    #[error("Cannot read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error generating content: {0}")]
    Generation(#[from] ModelError),

    #[error("Invalid service data: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("Service {domain}.{service} not found")]
    UnknownService { domain: String, service: String },
}
