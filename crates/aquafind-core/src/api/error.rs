use thiserror::Error;

#[derive(Error, Debug)]
pub enum FountainError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Empty response from fountain service")]
    EmptyResponse,

    #[error("Failed to parse fountain data: {0}")]
    Parse(String),

    #[error("Server error (status {status}): {body}")]
    Server { status: u16, body: String },

    #[error("Invalid coordinate: {latitude}, {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Fountain not found: {0}")]
    NotFound(String),

    #[error("Fountain already exists: {0}")]
    DuplicateId(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FountainError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        FountainError::Server {
            status: status.as_u16(),
            body: Self::truncate_body(body),
        }
    }
}

impl From<serde_json::Error> for FountainError {
    fn from(err: serde_json::Error) -> Self {
        FountainError::Parse(err.to_string())
    }
}
