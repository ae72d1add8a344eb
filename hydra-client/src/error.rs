use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Missing {0}")]
    MissingParameter(&'static str),

    #[error("Failed to send request: {0}")]
    RequestFailed(String),

    /// The admin interface answered with a non-success status.
    /// `error` and `description` carry the server's own error body when it sent one.
    #[error("Admin API error (status {status}): {error}: {description}")]
    ResponseError {
        status: u16,
        error: String,
        description: String,
    },

    #[error("Failed to deserialize response: {0}")]
    DeserializationError(String),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl AdminError {
    /// HTTP status that best represents this error to a trusted caller.
    pub fn status_code(&self) -> u16 {
        match self {
            AdminError::ResponseError { status, .. } => *status,
            AdminError::MissingParameter(_) => 400,
            _ => 502,
        }
    }
}
