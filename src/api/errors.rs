use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Http {
        status: u16,
        message: Option<String>,
    },
    #[error("Response error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Human-readable `message` returned by the auth API, if the server sent one.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Http {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Returns the API message or the provided fallback.
    pub fn message_or(&self, fallback: &str) -> String {
        self.api_message().unwrap_or(fallback).to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;

    #[test]
    fn api_message_only_for_http_errors_with_message() {
        let err = ApiError::Http {
            status: 400,
            message: Some("Invalid code".to_string()),
        };
        assert_eq!(err.api_message(), Some("Invalid code"));
        assert_eq!(err.status(), Some(400));

        let err = ApiError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(err.api_message(), None);

        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.api_message(), None);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn message_or_falls_back() {
        let err = ApiError::Timeout("Request timed out.".to_string());
        assert_eq!(err.message_or("Error signing up"), "Error signing up");

        let err = ApiError::Http {
            status: 409,
            message: Some("User already exists".to_string()),
        };
        assert_eq!(err.message_or("Error signing up"), "User already exists");
    }

    #[test]
    fn display_includes_status() {
        let err = ApiError::Http {
            status: 401,
            message: None,
        };
        assert_eq!(err.to_string(), "Request failed (401): no details");
    }
}
