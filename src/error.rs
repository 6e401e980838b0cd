use thiserror::Error;

/// Broad categories for failures from the external collaborators.
/// The kind drives UI hints (e.g. "run `gh auth login`"), the message is
/// what actually gets shown in the owning pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("required CLI tool is not installed")]
    NotInstalled,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("API error")]
    ApiError,
    #[error("not found")]
    NotFound,
    #[error("authentication failed")]
    AuthError,
}

/// A failed collaborator call: taxonomy tag plus the user-visible message.
/// These are stored in pane state, never propagated out of the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ApiError, message)
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        FetchError::api(err.to_string())
    }
}
