//! HTTP helpers for the Lambda entry point.

use lambda_http::{Body, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, FieldError, Result};

/// Generic error payload. `message` carries the underlying error text
/// only when debug exposure is enabled.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub message: String,
}

/// 422 payload listing every constraint violation.
#[derive(Debug, Serialize)]
pub struct ValidationErrorBody {
    pub detail: String,
    pub errors: Vec<FieldError>,
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
    headers: &[(&'static str, String)],
) -> Result<Response<Body>> {
    let json = serde_json::to_string(data)?;
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, value);
    }
    builder
        .body(Body::from(json))
        .map_err(|e| Error::Internal(format!("failed to build response: {e}")))
}

/// Create a bodyless response (204, preflight).
pub fn empty_response(status: u16, headers: &[(&'static str, String)]) -> Result<Response<Body>> {
    let mut builder = Response::builder().status(status);
    for (name, value) in headers {
        builder = builder.header(*name, value);
    }
    builder
        .body(Body::Empty)
        .map_err(|e| Error::Internal(format!("failed to build response: {e}")))
}

/// Parse a request body as JSON, mapping failure to a 400.
pub fn parse_body<T: DeserializeOwned>(body: &Body) -> Result<T> {
    serde_json::from_slice(body.as_ref())
        .map_err(|e| Error::BadRequest(format!("Invalid request body: {e}")))
}

/// Translate an error into the wire shape. `operation` names what the
/// request was doing ("create event") for generic 500 messages; the
/// underlying error text is hidden unless `debug_errors` is set.
pub fn error_response(
    error: &Error,
    operation: &str,
    debug_errors: bool,
    headers: &[(&'static str, String)],
) -> std::result::Result<Response<Body>, lambda_http::Error> {
    let status = error.status_code();
    let response = match error {
        Error::Validation(errors) => json_response(
            status,
            &ValidationErrorBody {
                detail: "Validation error".to_string(),
                errors: errors.clone(),
            },
            headers,
        ),
        Error::BadRequest(reason) | Error::NotFound(reason) => json_response(
            status,
            &ErrorBody {
                detail: reason.clone(),
                message: public_message(error, debug_errors),
            },
            headers,
        ),
        _ => json_response(
            status,
            &ErrorBody {
                detail: format!("Failed to {operation}"),
                message: public_message(error, debug_errors),
            },
            headers,
        ),
    };
    response.map_err(|e| lambda_http::Error::from(e.to_string()))
}

fn public_message(error: &Error, debug_errors: bool) -> String {
    if debug_errors {
        error.to_string()
    } else {
        "An unexpected error occurred".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(response: &Response<Body>) -> serde_json::Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[test]
    fn test_json_response_sets_status_and_content_type() {
        let response = json_response(201, &serde_json::json!({"ok": true}), &[]).unwrap();
        assert_eq!(response.status(), 201);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_json_response_applies_extra_headers() {
        let headers = vec![("Access-Control-Allow-Origin", "*".to_string())];
        let response = json_response(200, &serde_json::json!({}), &headers).unwrap();
        assert_eq!(
            response
                .headers()
                .get("Access-Control-Allow-Origin")
                .unwrap(),
            "*"
        );
    }

    #[test]
    fn test_empty_response_has_no_body() {
        let response = empty_response(204, &[]).unwrap();
        assert_eq!(response.status(), 204);
        assert!(matches!(response.body(), Body::Empty));
    }

    #[test]
    fn test_parse_body_rejects_malformed_json() {
        let result: Result<serde_json::Value> = parse_body(&Body::from("{not json"));
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_error_response_hides_store_detail_by_default() {
        let error = Error::Store("connection refused".to_string());
        let response = error_response(&error, "create event", false, &[]).unwrap();
        assert_eq!(response.status(), 500);
        let body = body_json(&response);
        assert_eq!(body["detail"], "Failed to create event");
        assert_eq!(body["message"], "An unexpected error occurred");
    }

    #[test]
    fn test_error_response_echoes_detail_in_debug_mode() {
        let error = Error::Store("connection refused".to_string());
        let response = error_response(&error, "create event", true, &[]).unwrap();
        let body = body_json(&response);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[test]
    fn test_validation_error_body_shape() {
        let error = Error::Validation(vec![FieldError {
            field: "capacity".to_string(),
            message: "must be greater than 0".to_string(),
            kind: "range".to_string(),
        }]);
        let response = error_response(&error, "create event", false, &[]).unwrap();
        assert_eq!(response.status(), 422);
        let body = body_json(&response);
        assert_eq!(body["detail"], "Validation error");
        assert_eq!(body["errors"][0]["field"], "capacity");
        assert_eq!(body["errors"][0]["type"], "range");
    }

    #[test]
    fn test_not_found_keeps_reason_in_detail() {
        let error = Error::NotFound("Event with id 'abc' not found".to_string());
        let response = error_response(&error, "get event", false, &[]).unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(body_json(&response)["detail"], "Event with id 'abc' not found");
    }
}
