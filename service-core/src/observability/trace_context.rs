//! Header propagation for service-to-service calls.
//!
//! Every outbound call carries the W3C `traceparent` of the current span, the
//! caller's correlation id, and the caller identity the gateway established.

use opentelemetry::trace::TraceContextExt;
use reqwest::header::HeaderMap;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::auth::{CallerIdentity, ROLES_HEADER, USER_HEADER};

pub const TRACEPARENT_HEADER: &str = "traceparent";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// `traceparent` value for the current span, if it is sampled into a trace.
pub fn current_traceparent() -> Option<String> {
    let context = Span::current().context();
    let span = context.span();
    let span_context = span.span_context();

    span_context.is_valid().then(|| {
        format!(
            "00-{}-{}-{:02x}",
            span_context.trace_id(),
            span_context.span_id(),
            span_context.trace_flags().to_u8()
        )
    })
}

pub fn extract_request_id(headers: &http::HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// A reqwest builder that stamps propagation headers at send time.
pub struct TracedRequest {
    request: reqwest::RequestBuilder,
    identity: Option<CallerIdentity>,
    request_id: Option<String>,
}

impl TracedRequest {
    pub fn new(request: reqwest::RequestBuilder) -> Self {
        Self {
            request,
            identity: None,
            request_id: None,
        }
    }

    /// Forward the caller identity as `user` / `roles` headers.
    pub fn identity(mut self, identity: &CallerIdentity) -> Self {
        self.identity = Some(identity.clone());
        self
    }

    pub fn request_id(mut self, request_id: Option<&str>) -> Self {
        self.request_id = request_id.map(str::to_string);
        self
    }

    pub fn json<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        Self {
            request: self.request.json(json),
            ..self
        }
    }

    /// Copies caller-supplied headers; propagation headers still win at send time.
    pub fn forward_headers(self, headers: HeaderMap) -> Self {
        Self {
            request: self.request.headers(headers),
            ..self
        }
    }

    pub fn body(self, body: impl Into<reqwest::Body>) -> Self {
        Self {
            request: self.request.body(body),
            ..self
        }
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(traceparent) = current_traceparent()
            && let Ok(value) = traceparent.parse()
        {
            headers.insert(TRACEPARENT_HEADER, value);
        }

        if let Some(id) = self.request_id.as_deref()
            && let Ok(value) = id.parse()
        {
            headers.insert(REQUEST_ID_HEADER, value);
        }

        if let Some(identity) = &self.identity {
            if let Ok(value) = identity.username.parse() {
                headers.insert(USER_HEADER, value);
            }
            if let Ok(value) = identity.roles_header().parse() {
                headers.insert(ROLES_HEADER, value);
            }
        }

        headers
    }

    pub async fn send(self) -> Result<reqwest::Response, reqwest::Error> {
        let headers = self.headers();
        self.request.headers(headers).send().await
    }
}

pub trait TracedClientExt {
    fn traced(&self, method: reqwest::Method, url: &str) -> TracedRequest;
    fn traced_get(&self, url: &str) -> TracedRequest;
    fn traced_post(&self, url: &str) -> TracedRequest;
    fn traced_put(&self, url: &str) -> TracedRequest;
}

impl TracedClientExt for reqwest::Client {
    fn traced(&self, method: reqwest::Method, url: &str) -> TracedRequest {
        TracedRequest::new(self.request(method, url))
    }

    fn traced_get(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.get(url))
    }

    fn traced_post(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.post(url))
    }

    fn traced_put(&self, url: &str) -> TracedRequest {
        TracedRequest::new(self.put(url))
    }
}
