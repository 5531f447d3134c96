use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for delivery providers.
///
/// Every variant is surfaced through the operation's single `error` exit,
/// so each one keeps whatever the provider (or transport) reported.
#[derive(Clone, Debug, PartialEq, Error, Deserialize, Serialize)]
pub enum Error {
    #[error("UrlParse: {0}")]
    UrlParse(String),
    #[error("RequestTimeout")]
    RequestTimeout,
    #[error("Request: {0}")]
    Request(String),
    #[error("JsonParse: {0}")]
    JsonParse(String),
    #[error("Rejected ({status}){}", describe_errors(.errors))]
    Rejected {
        status: u16,
        errors: Vec<String>,
        body: serde_json::Value,
    },
}

fn describe_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(": {}", errors.join("; "))
    }
}

// Conversions keep only the message so the error stays serializable
impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::UrlParse(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(err: serde_json::error::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_lists_provider_errors() {
        let err = Error::Rejected {
            status: 400,
            errors: vec!["Bad username / password".to_string(), "Missing to".to_string()],
            body: serde_json::json!({"message": "error"}),
        };

        assert_eq!(
            err.to_string(),
            "Rejected (400): Bad username / password; Missing to"
        );
    }

    #[test]
    fn test_rejected_display_without_errors() {
        let err = Error::Rejected {
            status: 502,
            errors: vec![],
            body: serde_json::Value::Null,
        };

        assert_eq!(err.to_string(), "Rejected (502)");
    }

    #[test]
    fn test_url_parse_conversion() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();

        assert!(matches!(err, Error::UrlParse(_)));
    }
}
