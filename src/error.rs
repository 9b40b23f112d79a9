//! Error types for backend calls and the submission lifecycle.

/// Transport-level failure talking to the consultation backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect/IO failure).
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}")]
    Status { status: u16 },

    /// The response body did not match the expected JSON shape.
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            ApiError::Status {
                status: status.as_u16(),
            }
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Request(e.to_string())
        }
    }
}

/// Why a submission did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Blank input; rejected before any side effect.
    #[error("query is empty")]
    EmptyQuery,

    /// Another submission is still in flight; the trigger is disabled.
    #[error("a submission is already in flight")]
    Busy,

    #[error(transparent)]
    Transport(#[from] ApiError),
}

impl SubmitError {
    /// Whether the submission got past validation and the single-flight guard.
    pub fn was_accepted(&self) -> bool {
        matches!(self, SubmitError::Transport(_))
    }
}
