// Error taxonomy for plan generation and execution. Remote API failures
// live in `api::ApiError`; everything here is either a missing setting,
// a domain outcome ("nothing matched", "nothing to do") or a malformed
// plan. All of them travel inside `anyhow::Error` and can be recovered
// with `downcast_ref`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("{0} environment variable is required")]
    MissingSetting(&'static str),

    #[error("no user found with email '{0}'")]
    UserNotFound(String),

    #[error("no albums found matching search term '{0}'")]
    NoMatchingAlbums(String),

    #[error("no assets found for person ID '{0}'")]
    NoAssetsForPerson(String),

    #[error("no albums found containing assets for person ID '{0}'")]
    NoAlbumsForPerson(String),

    #[error("no shared albums found for user '{0}'")]
    NoSharedAlbums(String),

    #[error("smart album '{0}' does not exist - please create it first")]
    SmartAlbumMissing(String),

    /// The target state already holds; the generator treats that as a failure.
    #[error("no changes needed - {0}")]
    NoChangesNeeded(String),

    #[error("search text must not be empty")]
    EmptySearchText,

    #[error("operation {0} has no apply requests")]
    EmptyOperation(usize),

    #[error("operation {index} has {apply} apply requests but {revert} revert requests")]
    UnpairedOperation {
        index: usize,
        apply: usize,
        revert: usize,
    },

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
}
