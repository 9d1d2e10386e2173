use http::{header, Method};
use pingora::protocols::http::ServerSession;
use pingora_error::Result;

use crate::api::ApiRequest;

/// Read the whole request body into memory.
pub async fn read_request_body(http_session: &mut ServerSession) -> Result<Vec<u8>> {
    let mut body_data = Vec::new();
    while let Some(bytes) = http_session.read_request_body().await? {
        body_data.extend_from_slice(&bytes);
    }
    Ok(body_data)
}

/// Retrieves the value of a specific header from the request.
///
/// Returns `None` if the header is not present or its value is not valid UTF-8.
pub fn get_req_header_value<'a>(http_session: &'a ServerSession, key: &str) -> Option<&'a str> {
    http_session
        .req_header()
        .headers
        .get(key)
        .and_then(|value| value.to_str().ok())
}

/// Collect everything the orders pipeline needs from a live session.
///
/// Bodies are only read for methods that carry one; a GET with a body is
/// answered without draining it.
pub async fn api_request_from_session(http_session: &mut ServerSession) -> Result<ApiRequest> {
    let (method, path) = {
        let req_header = http_session.req_header();
        (req_header.method.clone(), req_header.uri.path().to_string())
    };
    let content_type =
        get_req_header_value(http_session, header::CONTENT_TYPE.as_str()).map(str::to_string);

    let body = match method {
        Method::POST | Method::PUT | Method::DELETE => read_request_body(http_session).await?,
        _ => Vec::new(),
    };

    Ok(ApiRequest {
        method,
        path,
        content_type,
        body,
    })
}
