//! Error types for FlexPay operations.
//!
//! A single crate-level error enum covers the whole request/response cycle,
//! enabling precise error handling and recovery decisions: signing failures
//! and malformed responses are permanent, transport failures are retryable.

/// Comprehensive error type for FlexPay operations.
#[derive(Debug, thiserror::Error)]
pub enum FlexPayError {
    /// A parameter value could not be rendered to canonical request text.
    #[error("cannot encode parameter {parameter}: {reason}")]
    Encoding {
        /// Name of the offending parameter.
        parameter: String,
        /// Why rendering failed.
        reason: String,
    },

    /// The response body never contained the expected result element.
    #[error("malformed {operation} response: {reason}")]
    MalformedResponse {
        /// The API action whose response was being parsed.
        operation: String,
        /// What went wrong while parsing.
        reason: String,
    },

    /// The service answered with a non-success HTTP status.
    #[error("FPS REST API error: {status} {reason}\n\n{body}")]
    RestApi {
        /// HTTP status code.
        status: u16,
        /// HTTP status reason phrase.
        reason: String,
        /// Raw error body as returned by the service.
        body: String,
    },

    /// Reverse lookup of an enumerated value failed.
    #[error("unknown {domain} value: {value}")]
    UnknownValue {
        /// The enumerated domain (e.g. "PaymentMethod").
        domain: &'static str,
        /// The unrecognized input.
        value: String,
    },

    /// The endpoint URL could not be used for signing or dispatch.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// Transport/network layer error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection timeout.
    #[error("{operation} timed out after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Operation that timed out.
        operation: String,
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Internal/unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FlexPayError {
    /// Returns true if this error is potentially recoverable by retrying.
    ///
    /// Encoding failures and malformed responses are permanent integration
    /// problems; transport conditions and server-side HTTP failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::ConnectionTimeout { .. } => true,
            Self::RestApi { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    /// Create an encoding error.
    pub fn encoding(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encoding {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed-response error.
    pub fn malformed_response(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

impl From<url::ParseError> for FlexPayError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(FlexPayError::Transport("connection reset".into()).is_retryable());
        assert!(FlexPayError::RestApi {
            status: 503,
            reason: "Service Unavailable".into(),
            body: String::new(),
        }
        .is_retryable());
        assert!(!FlexPayError::RestApi {
            status: 400,
            reason: "Bad Request".into(),
            body: String::new(),
        }
        .is_retryable());
        assert!(!FlexPayError::encoding("TransactionAmount.Value", "not finite").is_retryable());
        assert!(!FlexPayError::malformed_response("Pay", "no result element").is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = FlexPayError::RestApi {
            status: 400,
            reason: "Bad Request".into(),
            body: "<Errors/>".into(),
        };
        let text = err.to_string();
        assert!(text.contains("400 Bad Request"));
        assert!(text.contains("<Errors/>"));

        let err = FlexPayError::UnknownValue {
            domain: "PaymentMethod",
            value: "XYZ".into(),
        };
        assert_eq!(err.to_string(), "unknown PaymentMethod value: XYZ");
    }

    #[test]
    fn test_url_parse_error_conversion() {
        let err: FlexPayError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, FlexPayError::InvalidEndpoint(_)));
    }
}
