//! CORS policy applied to every response.

/// Methods the API answers to.
const ALLOWED_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
/// Request headers accepted on cross-origin calls.
const ALLOWED_HEADERS: &str = "Content-Type,Authorization,Accept,Origin";
/// Preflight cache lifetime.
const MAX_AGE_SECONDS: &str = "3600";

/// Origin allow-list resolved from configuration.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    /// Empty means any origin is allowed.
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    /// Parse a comma-separated origin list. `"*"` (or an empty value)
    /// allows any origin.
    pub fn new(origins: &str) -> Self {
        let allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty() && *origin != "*")
            .map(String::from)
            .collect();
        Self { allowed_origins }
    }

    /// The `Access-Control-Allow-Origin` value for a request from
    /// `origin`, or `None` when the origin is not allowed.
    pub fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        if self.allowed_origins.is_empty() {
            return Some("*".to_string());
        }
        origin
            .filter(|o| self.allowed_origins.iter().any(|allowed| allowed == o))
            .map(String::from)
    }

    /// Headers attached to every response.
    pub fn response_headers(&self, origin: Option<&str>) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();
        if let Some(allow) = self.allow_origin(origin) {
            // Credentials are only valid against a concrete origin.
            if allow != "*" {
                headers.push(("Access-Control-Allow-Credentials", "true".to_string()));
            }
            headers.push(("Access-Control-Allow-Origin", allow));
        }
        headers
    }

    /// Headers for an `OPTIONS` preflight response.
    pub fn preflight_headers(&self, origin: Option<&str>) -> Vec<(&'static str, String)> {
        let mut headers = self.response_headers(origin);
        headers.push(("Access-Control-Allow-Methods", ALLOWED_METHODS.to_string()));
        headers.push(("Access-Control-Allow-Headers", ALLOWED_HEADERS.to_string()));
        headers.push(("Access-Control-Max-Age", MAX_AGE_SECONDS.to_string()));
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_allows_any_origin() {
        let policy = CorsPolicy::new("*");
        assert_eq!(policy.allow_origin(None).as_deref(), Some("*"));
        assert_eq!(
            policy.allow_origin(Some("https://example.com")).as_deref(),
            Some("*")
        );
    }

    #[test]
    fn test_allow_list_echoes_matching_origin() {
        let policy = CorsPolicy::new("https://app.example.com, https://admin.example.com");
        assert_eq!(
            policy.allow_origin(Some("https://app.example.com")).as_deref(),
            Some("https://app.example.com")
        );
        assert_eq!(policy.allow_origin(Some("https://evil.example.com")), None);
        assert_eq!(policy.allow_origin(None), None);
    }

    #[test]
    fn test_concrete_origin_gets_credentials_header() {
        let policy = CorsPolicy::new("https://app.example.com");
        let headers = policy.response_headers(Some("https://app.example.com"));
        assert!(headers
            .iter()
            .any(|(name, value)| *name == "Access-Control-Allow-Credentials" && value == "true"));
    }

    #[test]
    fn test_wildcard_omits_credentials_header() {
        let policy = CorsPolicy::new("*");
        let headers = policy.response_headers(Some("https://example.com"));
        assert!(!headers
            .iter()
            .any(|(name, _)| *name == "Access-Control-Allow-Credentials"));
    }

    #[test]
    fn test_preflight_headers_carry_fixed_lists() {
        let policy = CorsPolicy::new("*");
        let headers = policy.preflight_headers(None);
        let find = |name: &str| {
            headers
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(
            find("Access-Control-Allow-Methods"),
            Some("GET,POST,PUT,DELETE,OPTIONS")
        );
        assert_eq!(
            find("Access-Control-Allow-Headers"),
            Some("Content-Type,Authorization,Accept,Origin")
        );
        assert_eq!(find("Access-Control-Max-Age"), Some("3600"));
    }
}
