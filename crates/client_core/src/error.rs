use shared::error::{ErrorBody, RecordError};
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";

/// Failure talking to the submissions resource.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error ({status})")]
    Server { status: u16, detail: Option<String> },
    #[error("request rejected ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Application { status: u16, detail: Option<String> },
    #[error("submission not found")]
    NotFound { detail: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("response did not include a submission id")]
    MissingId,
}

impl ClientError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = ErrorBody::parse(body);
        match status {
            404 => Self::NotFound { detail },
            status if status >= 500 => Self::Server { status, detail },
            _ => Self::Application { status, detail },
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Server { detail, .. }
            | Self::Application { detail, .. }
            | Self::NotFound { detail } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_server_fault(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// Single user-facing line: server detail first, then connectivity,
    /// then server fault, then the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_string();
        }
        if self.is_network() {
            return NETWORK_ERROR_MESSAGE.to_string();
        }
        if self.is_server_fault() {
            return SERVER_ERROR_MESSAGE.to_string();
        }
        fallback.to_string()
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else if let Some(status) = value.status() {
            Self::from_status(status.as_u16(), "")
        } else {
            Self::Network(value.to_string())
        }
    }
}

impl From<RecordError> for ClientError {
    fn from(value: RecordError) -> Self {
        match value {
            RecordError::MissingId => Self::MissingId,
            other => Self::Decode(other.to_string()),
        }
    }
}
