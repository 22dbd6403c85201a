use thiserror::Error;

/// Errors raised by an LLM provider client
#[derive(Error, Debug)]
pub enum LlmError {
    /// Authentication failed (HTTP 401/403, or no key configured)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Invalid request parameters (HTTP 400/413)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Any other non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("Parse error: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },

    /// A tool declaration could not be turned into a JSON Schema
    #[error("Invalid tool schema: {message}")]
    InvalidToolSchema { message: String },
}

impl LlmError {
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn rate_limit<S: Into<String>>(message: S, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn api_error<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status and its message
    pub fn from_status(status: u16, message: String, retry_after: Option<u64>) -> Self {
        match status {
            400 => Self::invalid_request(message),
            401 | 403 => Self::authentication(message),
            413 => Self::invalid_request("Request too large"),
            429 => Self::rate_limit(message, retry_after),
            _ => Self::api_error(status, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            LlmError::from_status(400, "bad".into(), None),
            LlmError::InvalidRequest { .. }
        ));
        assert!(matches!(
            LlmError::from_status(403, "denied".into(), None),
            LlmError::Authentication { .. }
        ));
        assert!(matches!(
            LlmError::from_status(429, "slow down".into(), Some(30)),
            LlmError::RateLimit {
                retry_after: Some(30),
                ..
            }
        ));
        assert!(matches!(
            LlmError::from_status(529, "overloaded".into(), None),
            LlmError::Api { status: 529, .. }
        ));
    }
}
