//! Configuration management for the events API.

use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB table holding event records
    pub table_name: String,
    /// AWS region
    pub aws_region: String,
    /// Endpoint override for a local DynamoDB (if applicable)
    pub store_endpoint: Option<String>,
    /// Comma-separated CORS origin allow-list ("*" allows any origin)
    pub cors_origins: String,
    /// Echo backend error messages to clients instead of a fixed string
    pub debug_errors: bool,
}

impl Config {
    /// Load configuration from environment variables, once at process start.
    pub fn from_env() -> Self {
        Self {
            table_name: env::var("DYNAMODB_TABLE_NAME").unwrap_or_else(|_| "events".to_string()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            store_endpoint: env::var("DYNAMODB_ENDPOINT_URL").ok(),
            cors_origins: env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            debug_errors: env::var("DEBUG_ERRORS")
                .map(|v| flag_enabled(&v))
                .unwrap_or(false),
        }
    }
}

fn flag_enabled(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "True")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_enabled() {
        assert!(flag_enabled("true"));
        assert!(flag_enabled("1"));
        assert!(flag_enabled(" True "));
        assert!(!flag_enabled("false"));
        assert!(!flag_enabled("0"));
        assert!(!flag_enabled(""));
    }
}
