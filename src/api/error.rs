use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success response. `message` is the response body, or `HTTP <status>` when
    /// the server sent nothing.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("server returned no content")]
    EmptyBody,
}

impl ApiError {
    pub fn from_status(status: u16, body: String) -> Self {
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body
        };
        ApiError::Status { status, message }
    }

    /// HTTP status of a server-reported failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
