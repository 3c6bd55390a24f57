//! Error types for the events API.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A single constraint violation reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Payload field the violation refers to
    pub field: String,
    /// Human-readable description of the violation
    pub message: String,
    /// Machine-readable violation code
    #[serde(rename = "type")]
    pub kind: String,
}

/// Errors that can occur while serving an API request.
#[derive(Error, Debug)]
pub enum Error {
    /// Backend store failure of any kind
    #[error("Store error: {0}")]
    Store(String),

    /// Request payload violated the event schema
    #[error("Validation error")]
    Validation(Vec<FieldError>),

    /// Malformed request (empty id, empty update payload, unparseable body)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 422,
            Error::BadRequest(_) => 400,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, violations)| {
                violations.iter().map(move |violation| FieldError {
                    field: field.to_string(),
                    message: violation
                        .message
                        .clone()
                        .map(|m| m.into_owned())
                        .unwrap_or_else(|| format!("invalid value for {field}")),
                    kind: violation.code.to_string(),
                })
            })
            .collect();
        // HashMap iteration order is arbitrary; keep responses stable.
        fields.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.kind.cmp(&b.kind)));
        Error::Validation(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
        #[validate(range(min = 1, message = "must be greater than 0"))]
        count: i64,
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Validation(vec![]).status_code(), 422);
        assert_eq!(Error::BadRequest("x".into()).status_code(), 400);
        assert_eq!(Error::NotFound("x".into()).status_code(), 404);
        assert_eq!(Error::Store("x".into()).status_code(), 500);
        assert_eq!(Error::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_validation_errors_flatten_to_field_errors() {
        let probe = Probe {
            name: String::new(),
            count: -5,
        };
        let error = Error::from(probe.validate().unwrap_err());
        let Error::Validation(fields) = error else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "count");
        assert_eq!(fields[0].kind, "range");
        assert_eq!(fields[0].message, "must be greater than 0");
        assert_eq!(fields[1].field, "name");
        assert_eq!(fields[1].kind, "length");
    }
}
