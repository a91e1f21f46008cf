use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-2xx response; `body` is the raw response text, possibly empty.
    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Validation(String),

    #[error("Credential store error: {0}")]
    Credentials(String),

    #[error("Could not create or find muscle group {0:?}")]
    MuscleGroupUnavailable(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
