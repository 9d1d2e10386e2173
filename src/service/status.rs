use async_trait::async_trait;
use http::{Response, StatusCode};
use pingora::{
    apps::http_app::ServeHttp, protocols::http::ServerSession, services::listening::Service,
};
use serde::Serialize;

use crate::{
    config::Status,
    core::status,
    utils::response::{CommonErrors, ResponseBuilder},
};

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

/// Readiness probe, served on its own listener so load balancers can poll
/// it without touching the orders API.
///
/// - 200 `{"status": "ok"}` once the order store is loaded
/// - 503 with error details before that
pub struct StatusHttpApp;

impl StatusHttpApp {
    pub fn status_http_service(cfg: &Status) -> Service<Self> {
        let mut service = Service::new("Status HTTP".to_string(), StatusHttpApp);
        service.add_tcp(&cfg.address.to_string());
        service
    }

    pub fn respond(path: &str) -> Response<Vec<u8>> {
        match path {
            "/status/ready" => handle_ready_endpoint(),
            _ => CommonErrors::path_not_found(path),
        }
    }
}

#[async_trait]
impl ServeHttp for StatusHttpApp {
    async fn response(&self, http_session: &mut ServerSession) -> Response<Vec<u8>> {
        http_session.set_keepalive(None);
        Self::respond(http_session.req_header().uri.path())
    }
}

fn handle_ready_endpoint() -> Response<Vec<u8>> {
    if status::is_ready() {
        ResponseBuilder::json(
            StatusCode::OK,
            &StatusResponse {
                status: "ok",
                error: None,
            },
        )
    } else {
        ResponseBuilder::json(
            StatusCode::SERVICE_UNAVAILABLE,
            &StatusResponse {
                status: "error",
                error: Some("Order store not loaded yet"),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::tests::TEST_LOCK;

    #[test]
    fn test_ready_endpoint() {
        let _guard = TEST_LOCK.lock().unwrap();
        status::reset();
        let response = StatusHttpApp::respond("/status/ready");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        status::mark_ready(1);
        let response = StatusHttpApp::respond("/status/ready");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), br#"{"status":"ok"}"#);
    }

    #[test]
    fn test_unknown_status_path() {
        let response = StatusHttpApp::respond("/status/live");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
