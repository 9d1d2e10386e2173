//! HTTP front of the orders resource.
//!
//! [`OrdersHttpApp`] owns the [`OrderStore`] for the life of the process and
//! routes each request to one of the handlers in [`crate::orders::handlers`].

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, PoisonError},
    time::Instant,
};

use async_trait::async_trait;
use http::{Method, Response};
use matchit::{Match, Router};
use once_cell::sync::Lazy;
use pingora::{
    apps::http_app::ServeHttp, protocols::http::ServerSession, services::listening::Service,
};
use pingora_error::Result;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramOpts,
    HistogramVec, IntCounter, IntCounterVec,
};

use crate::{
    config::{Grubdash, Tls},
    core::{OrderError, OrderResult},
    orders::{handlers, OrderStore, Reply},
    utils::{
        request::api_request_from_session,
        response::{content_type, CommonErrors, ResponseBuilder},
    },
};

const DEFAULT_BUCKETS: &[f64] = &[
    0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0,
];

// Route label for paths that matched nothing.
const UNMATCHED_ROUTE: &str = "unmatched";

static REQUESTS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "grubdash_http_requests_total",
        "The total number of order API requests since grubdash started"
    )
    .unwrap()
});

static STATUS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "grubdash_http_status",
        "HTTP status codes per order API route",
        &[
            "code",   // HTTP status code
            "method", // HTTP method
            "route",  // Route template, never the raw path
        ]
    )
    .unwrap()
});

static LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    let opts = HistogramOpts::new(
        "grubdash_http_latency",
        "Order API request latency in milliseconds",
    )
    .buckets(DEFAULT_BUCKETS.to_vec());
    register_histogram_vec!(opts, &["method", "route"]).unwrap()
});

/// A request stripped down to what the pipeline looks at.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Attach a body sent as `application/json`.
    pub fn json(self, body: impl Into<Vec<u8>>) -> Self {
        self.with_body(content_type::APPLICATION_JSON, body)
    }

    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.content_type = Some(content_type.to_string());
        self.body = body.into();
        self
    }

    // Parameters such as `; charset=utf-8` are allowed.
    fn is_json(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| {
            ct.split(';')
                .next()
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(content_type::APPLICATION_JSON))
        })
    }
}

trait Handler {
    fn handle(
        &self,
        store: &mut OrderStore,
        request: &ApiRequest,
        params: &BTreeMap<String, String>,
    ) -> OrderResult<Reply>;

    /// Whether the request must declare a JSON body.
    fn requires_json(&self) -> bool {
        false
    }
}

fn order_id(params: &BTreeMap<String, String>) -> OrderResult<&str> {
    params
        .get("order_id")
        .map(String::as_str)
        .ok_or_else(|| OrderError::NotFound(String::new()))
}

struct ListOrders;

impl Handler for ListOrders {
    fn handle(
        &self,
        store: &mut OrderStore,
        _request: &ApiRequest,
        _params: &BTreeMap<String, String>,
    ) -> OrderResult<Reply> {
        handlers::list(store)
    }
}

struct CreateOrder;

impl Handler for CreateOrder {
    fn handle(
        &self,
        store: &mut OrderStore,
        request: &ApiRequest,
        _params: &BTreeMap<String, String>,
    ) -> OrderResult<Reply> {
        handlers::create(store, &request.body)
    }

    fn requires_json(&self) -> bool {
        true
    }
}

struct ReadOrder;

impl Handler for ReadOrder {
    fn handle(
        &self,
        store: &mut OrderStore,
        _request: &ApiRequest,
        params: &BTreeMap<String, String>,
    ) -> OrderResult<Reply> {
        handlers::read(store, order_id(params)?)
    }
}

struct UpdateOrder;

impl Handler for UpdateOrder {
    fn handle(
        &self,
        store: &mut OrderStore,
        request: &ApiRequest,
        params: &BTreeMap<String, String>,
    ) -> OrderResult<Reply> {
        handlers::update(store, order_id(params)?, &request.body)
    }

    fn requires_json(&self) -> bool {
        true
    }
}

struct DeleteOrder;

impl Handler for DeleteOrder {
    fn handle(
        &self,
        store: &mut OrderStore,
        request: &ApiRequest,
        params: &BTreeMap<String, String>,
    ) -> OrderResult<Reply> {
        handlers::destroy(store, order_id(params)?, &request.body)
    }
}

struct RouteEntry {
    template: &'static str,
    handlers: HashMap<Method, Box<dyn Handler + Send + Sync>>,
}

#[derive(Default)]
struct Routes(BTreeMap<&'static str, HashMap<Method, Box<dyn Handler + Send + Sync>>>);

impl Routes {
    /// Register `handler` for `method` on `path`.
    fn route(
        &mut self,
        path: &'static str,
        method: Method,
        handler: Box<dyn Handler + Send + Sync>,
    ) -> &mut Self {
        self.0.entry(path).or_default().insert(method, handler);
        self
    }

    fn into_router(self) -> Router<RouteEntry> {
        let mut router = Router::new();
        for (template, handlers) in self.0 {
            if let Err(e) = router.insert(template, RouteEntry { template, handlers }) {
                log::error!("Failed to register route {template}: {e}");
            }
        }
        router
    }
}

pub struct OrdersHttpApp {
    store: Mutex<OrderStore>,
    router: Router<RouteEntry>,
}

impl OrdersHttpApp {
    pub fn new(store: OrderStore) -> Self {
        let mut routes = Routes::default();
        routes
            .route("/orders", Method::GET, Box::new(ListOrders))
            .route("/orders", Method::POST, Box::new(CreateOrder))
            .route("/orders/{order_id}", Method::GET, Box::new(ReadOrder))
            .route("/orders/{order_id}", Method::PUT, Box::new(UpdateOrder))
            .route("/orders/{order_id}", Method::DELETE, Box::new(DeleteOrder));

        Self {
            store: Mutex::new(store),
            router: routes.into_router(),
        }
    }

    /// Build the listening service with one endpoint per configured listener.
    pub fn orders_http_service(cfg: &Grubdash, store: OrderStore) -> Result<Service<Self>> {
        let mut service = Service::new("Orders HTTP".to_string(), Self::new(store));
        for listener in &cfg.listeners {
            let addr = listener.address.to_string();
            match &listener.tls {
                Some(Tls {
                    cert_path,
                    key_path,
                }) => service.add_tls(&addr, cert_path, key_path)?,
                None => service.add_tcp(&addr),
            }
        }
        Ok(service)
    }

    /// Route and answer one request, recording metrics for it.
    pub fn dispatch(&self, request: &ApiRequest) -> Response<Vec<u8>> {
        let started = Instant::now();
        let (route, response) = self.route_request(request);

        REQUESTS.inc();
        STATUS
            .with_label_values(&[response.status().as_str(), request.method.as_str(), route])
            .inc();
        LATENCY
            .with_label_values(&[request.method.as_str(), route])
            .observe(started.elapsed().as_secs_f64() * 1000.0);

        log::debug!(
            "{} {} -> {}",
            request.method,
            request.path,
            response.status().as_u16()
        );
        response
    }

    fn route_request(&self, request: &ApiRequest) -> (&'static str, Response<Vec<u8>>) {
        let Ok(Match { value, params }) = self.router.at(&request.path) else {
            return (UNMATCHED_ROUTE, CommonErrors::path_not_found(&request.path));
        };
        let Some(handler) = value.handlers.get(&request.method) else {
            return (
                value.template,
                CommonErrors::method_not_allowed(&request.method, &request.path),
            );
        };

        let params: BTreeMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let result = if handler.requires_json() && !request.is_json() {
            Err(OrderError::UnsupportedContentType)
        } else {
            // The whole guard chain runs under one lock so each request sees
            // and leaves a consistent store.
            let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
            handler.handle(&mut store, request, &params)
        };

        let response = match result {
            Ok(reply) => ResponseBuilder::from_reply(&reply),
            Err(e) => {
                log::warn!("{} {} rejected: {e}", request.method, request.path);
                ResponseBuilder::from_error(&e)
            }
        };
        (value.template, response)
    }
}

#[async_trait]
impl ServeHttp for OrdersHttpApp {
    async fn response(&self, http_session: &mut ServerSession) -> Response<Vec<u8>> {
        http_session.set_keepalive(None);

        match api_request_from_session(http_session).await {
            Ok(request) => self.dispatch(&request),
            Err(e) => {
                log::warn!("Failed to read request: {e}");
                CommonErrors::bad_request("Failed to read request body")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use serde_json::{json, Value};

    use super::*;
    use crate::orders::{
        store::tests::{order, SequentialIds},
        OrderStatus,
    };

    fn app() -> OrdersHttpApp {
        OrdersHttpApp::new(OrderStore::with_orders(
            vec![order("abc", Some(OrderStatus::Pending))],
            Box::<SequentialIds>::default(),
        ))
    }

    fn message(response: &Response<Vec<u8>>) -> String {
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        body["message"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_unknown_path() {
        let response = app().dispatch(&ApiRequest::new(Method::GET, "/dishes"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(message(&response), "Path not found: /dishes");
    }

    #[test]
    fn test_method_not_allowed() {
        let app = app();
        let response = app.dispatch(&ApiRequest::new(Method::PATCH, "/orders/abc"));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(message(&response), "PATCH not allowed for /orders/abc");

        let response = app.dispatch(&ApiRequest::new(Method::DELETE, "/orders"));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_write_requires_json_content_type() {
        let app = app();
        let body = json!({"data": {"deliverTo": "A", "mobileNumber": "1", "dishes": [{"quantity": 1}]}})
            .to_string();

        let response = app.dispatch(
            &ApiRequest::new(Method::POST, "/orders").with_body("text/plain", body.clone()),
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(message(&response), "Content-Type must be application/json");

        let response = app.dispatch(
            &ApiRequest::new(Method::POST, "/orders")
                .with_body("application/json; charset=utf-8", body),
        );
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_delete_without_body_or_content_type() {
        let response = app().dispatch(&ApiRequest::new(Method::DELETE, "/orders/abc"));
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_dispatch_records_metrics() {
        let app = app();
        let counter = STATUS.with_label_values(&["404", "GET", "/orders/{order_id}"]);
        let before = counter.get();

        let response = app.dispatch(&ApiRequest::new(Method::GET, "/orders/missing"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(counter.get() > before);
        assert!(REQUESTS.get() >= 1);
    }
}
