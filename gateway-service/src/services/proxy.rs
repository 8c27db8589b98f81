use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::HeaderMap;
use axum::response::Response;
use service_core::auth::{CallerIdentity, ROLES_HEADER, USER_HEADER};
use service_core::observability::TracedClientExt;
use std::time::{Duration, Instant};
use tracing::instrument;

use super::error::GatewayError;
use super::metrics;
use crate::routing::RouteTable;

/// Headers that describe a single connection and never cross the proxy.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

#[derive(Clone)]
pub struct Proxy {
    http: reqwest::Client,
    routes: RouteTable,
    max_body_bytes: usize,
}

impl Proxy {
    /// Redirects are relayed to the caller rather than followed.
    pub fn new(
        routes: RouteTable,
        timeout: Duration,
        max_body_bytes: usize,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            routes,
            max_body_bytes,
        })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Sends `req` to the service owning its path and relays the answer as is.
    #[instrument(
        skip(self, identity, req),
        fields(method = %req.method(), path = %req.uri().path(), service)
    )]
    pub async fn forward(
        &self,
        identity: Option<&CallerIdentity>,
        request_id: Option<&str>,
        req: Request,
    ) -> Result<Response, GatewayError> {
        let path = req.uri().path().to_string();
        let route = self
            .routes
            .resolve(&path)
            .ok_or_else(|| GatewayError::NoRoute(path.clone()))?;
        tracing::Span::current().record("service", route.service.as_str());

        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or(path.as_str());
        let url = route.target_url(path_and_query);

        let (parts, body) = req.into_parts();
        let body = to_bytes(body, self.max_body_bytes)
            .await
            .map_err(GatewayError::Body)?;

        let mut headers = without_hop_by_hop(parts.headers);
        headers.remove(USER_HEADER);
        headers.remove(ROLES_HEADER);

        let mut request = self
            .http
            .traced(parts.method, &url)
            .forward_headers(headers)
            .request_id(request_id)
            .body(body);
        if let Some(identity) = identity {
            request = request.identity(identity);
        }

        let started = Instant::now();
        let upstream = request
            .send()
            .await
            .map_err(|source| GatewayError::Unreachable {
                service: route.service.clone(),
                source,
            })?;

        let status = upstream.status();
        let headers = without_hop_by_hop(upstream.headers().clone());
        let bytes = upstream
            .bytes()
            .await
            .map_err(GatewayError::UpstreamBody)?;

        metrics::record_proxied(&route.service, status.as_u16(), started.elapsed());
        tracing::debug!(status = status.as_u16(), "Upstream answered");

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

fn without_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
    headers
}
