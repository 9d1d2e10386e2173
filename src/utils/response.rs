//! Response building for the orders and status services.
//!
//! Every body this crate produces is JSON: `{ "data": ... }` on success and
//! `{ "status": <code>, "message": <text> }` on failure.

use http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;

use crate::core::OrderError;
use crate::orders::Reply;

/// Standard content types
pub mod content_type {
    pub const TEXT_PLAIN: &str = "text/plain";
    pub const APPLICATION_JSON: &str = "application/json";
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: u16,
    message: &'a str,
}

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Build a response with an optional content type.
    pub fn http(status: StatusCode, body: Vec<u8>, content_type: Option<&str>) -> Response<Vec<u8>> {
        let mut builder = Response::builder().status(status);

        if let Some(ct) = content_type {
            match HeaderValue::from_str(ct) {
                Ok(header_value) => {
                    builder = builder.header(header::CONTENT_TYPE, header_value);
                }
                Err(e) => {
                    log::error!("Invalid content type '{}': {}", ct, e);
                }
            }
        }

        builder.body(body).unwrap_or_else(|e| {
            log::error!("Failed to build response: {}", e);
            Self::internal_server_error()
        })
    }

    /// Serialize `data` as the JSON body.
    pub fn json<T: Serialize>(status: StatusCode, data: &T) -> Response<Vec<u8>> {
        match serde_json::to_vec(data) {
            Ok(json_body) => Self::http(status, json_body, Some(content_type::APPLICATION_JSON)),
            Err(e) => {
                log::error!("Failed to serialize JSON response: {}", e);
                Self::internal_server_error()
            }
        }
    }

    /// `{ "status": <code>, "message": <text> }`
    pub fn error_json(status: StatusCode, message: &str) -> Response<Vec<u8>> {
        Self::json(
            status,
            &ErrorBody {
                status: status.as_u16(),
                message,
            },
        )
    }

    pub fn no_content() -> Response<Vec<u8>> {
        Self::http(StatusCode::NO_CONTENT, Vec::new(), None)
    }

    pub fn from_reply(reply: &Reply) -> Response<Vec<u8>> {
        match reply {
            Reply::Data(status, data) => Self::json(*status, data),
            Reply::NoContent => Self::no_content(),
        }
    }

    pub fn from_error(err: &OrderError) -> Response<Vec<u8>> {
        Self::error_json(err.status_code(), &err.to_string())
    }

    // Last resort when even building a response fails; no JSON so nothing
    // else can go wrong.
    fn internal_server_error() -> Response<Vec<u8>> {
        let mut response = Response::new(b"Internal Server Error".to_vec());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type::TEXT_PLAIN),
        );
        response
    }
}

/// Common error response helpers
pub struct CommonErrors;

impl CommonErrors {
    pub fn path_not_found(path: &str) -> Response<Vec<u8>> {
        ResponseBuilder::error_json(StatusCode::NOT_FOUND, &format!("Path not found: {path}"))
    }

    pub fn method_not_allowed(method: &http::Method, path: &str) -> Response<Vec<u8>> {
        ResponseBuilder::error_json(
            StatusCode::METHOD_NOT_ALLOWED,
            &format!("{method} not allowed for {path}"),
        )
    }

    pub fn bad_request(message: &str) -> Response<Vec<u8>> {
        ResponseBuilder::error_json(StatusCode::BAD_REQUEST, message)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn body_json(response: &Response<Vec<u8>>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_json_response() {
        let response = ResponseBuilder::json(StatusCode::CREATED, &json!({"data": {"id": "1"}}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            content_type::APPLICATION_JSON
        );
        assert_eq!(response.body(), br#"{"data":{"id":"1"}}"#);
    }

    #[test]
    fn test_error_response() {
        let response = ResponseBuilder::error_json(StatusCode::BAD_REQUEST, "Invalid input");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(&response),
            json!({"status": 400, "message": "Invalid input"})
        );
    }

    #[test]
    fn test_no_content() {
        let response = ResponseBuilder::from_reply(&Reply::NoContent);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_empty());
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_from_error() {
        let response = ResponseBuilder::from_error(&OrderError::NotFound("42".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(&response)["message"], "Order id not found: 42");
    }

    #[test]
    fn test_common_errors() {
        let response = CommonErrors::method_not_allowed(&http::Method::PATCH, "/orders");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(&response)["message"], "PATCH not allowed for /orders");

        let response = CommonErrors::path_not_found("/dishes");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
