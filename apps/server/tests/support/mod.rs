pub mod assertions;
pub mod logs;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use devops_lifecycle_demo::{
    api::{create_router, pipeline, routes::service_routes},
    AppState, Config,
};
use serde_json::Value;
use tower::ServiceExt as _;

// Re-export commonly used items
pub use assertions::*;
pub use logs::*;

#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> anyhow::Result<Value> {
        serde_json::from_slice(&self.body).context("parse response body as JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::new_with_config(|_| {})
    }

    pub fn new_with_config(configure: impl FnOnce(&mut Config)) -> Self {
        let state = AppState::new(test_config(configure));
        let router = create_router(state.clone());
        Self { router, state }
    }

    /// Service routes plus `extra`, wrapped in the same pipeline.
    pub fn with_extra_routes(extra: Router<AppState>) -> Self {
        let state = AppState::new(test_config(|_| {}));
        let router = pipeline(service_routes().merge(extra), state.clone());
        Self { router, state }
    }

    pub async fn get(&self, path_and_query: &str) -> anyhow::Result<TestResponse> {
        self.request(Method::GET, path_and_query, None).await
    }

    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
    ) -> anyhow::Result<TestResponse> {
        self.request_with_extra_headers(method, path_and_query, body, &[])
            .await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Bytes>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<TestResponse> {
        let mut request = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header("host", "localhost")
            .header("user-agent", "integration-tests")
            .body(match body {
                Some(bytes) => Body::from(bytes),
                None => Body::empty(),
            })
            .context("build request")?;

        for (name, value) in extra_headers {
            request.headers_mut().insert(
                name.parse::<HeaderName>().context("parse header name")?,
                value.parse::<HeaderValue>().context("parse header value")?,
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }
}

fn test_config(configure: impl FnOnce(&mut Config)) -> Config {
    let mut config = Config {
        environment: "test".to_string(),
        instance_guid: "test-instance".to_string(),
        ..Config::default()
    };
    configure(&mut config);
    config
}
