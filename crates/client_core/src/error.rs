use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("server url cannot be used as a base: {0}")]
    CannotBeABase(String),
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request with status {status}")]
    Rejected { status: u16, detail: Option<String> },
    #[error("server rejected request with status {status} and a body that is not JSON")]
    UnreadableRejection { status: u16 },
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ClientError {
    /// `detail` from a `{"detail": ...}` failure body, when the server sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True when the server answered with a non-success status, as opposed to
    /// the request never completing.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Rejected { .. } | Self::UnreadableRejection { .. }
        )
    }
}
