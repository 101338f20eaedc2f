use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("credential refresh failed: {0}")]
    Refresh(String),
    #[error("credential update hook failed: {0}")]
    Hook(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}: {1}")]
    Status(StatusCode, String),
    #[error("invalid authorization header: {0}")]
    InvalidHeader(String),
    #[error("request body cannot be cloned")]
    UnclonableRequest,
    #[error("context cancelled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
    #[error("config error: {0}")]
    Config(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeader(err.to_string())
    }
}
