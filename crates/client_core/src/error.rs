use thiserror::Error;

/// Faults raised before an HTTP reply could be interpreted.
///
/// Application-level failures (non-2xx statuses, `success: false` bodies) are
/// not transport errors; they travel inside [`crate::ApiReply`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("could not reach server: {0}")]
    Connect(String),
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let text = err.to_string();
        if err.is_timeout() {
            TransportError::Timeout(text)
        } else if err.is_connect() {
            TransportError::Connect(text)
        } else if err.is_decode() {
            TransportError::Decode(text)
        } else if err.is_builder() {
            TransportError::InvalidUrl(text)
        } else {
            TransportError::Request(text)
        }
    }
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}
