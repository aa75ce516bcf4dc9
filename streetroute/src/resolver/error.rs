//! Resolution error types.

use thiserror::Error;

use crate::route::ViewpointId;

/// Errors produced while resolving a viewpoint.
///
/// Credential errors are returned before any state changes. `FetchFailed` is
/// recorded on the viewpoint itself; the upstream cause is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("No imagery API key configured")]
    MissingCredential,

    #[error("Imagery API key has an invalid format")]
    InvalidCredentialFormat,

    #[error("Failed to fetch street-level image")]
    FetchFailed,

    #[error("No viewpoint {0} in the current sequence")]
    UnknownViewpoint(ViewpointId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ResolutionError::UnknownViewpoint(ViewpointId(7)).to_string(),
            "No viewpoint #7 in the current sequence"
        );
        assert_eq!(
            ResolutionError::MissingCredential.to_string(),
            "No imagery API key configured"
        );
    }
}
