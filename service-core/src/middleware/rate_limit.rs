use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
};
use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use crate::error::AppError;

/// Rate limiter keyed by client IP.
pub type IpRateLimiter = Arc<RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock>>;

/// Allows `attempts` requests per IP every `window_seconds`, refilling evenly.
pub fn create_ip_rate_limiter(attempts: u32, window_seconds: u64) -> Result<IpRateLimiter, AppError> {
    let burst = NonZeroU32::new(attempts.max(1))
        .ok_or_else(|| AppError::ConfigError(anyhow::anyhow!("rate limit must be positive")))?;
    let period = Duration::from_millis((window_seconds.max(1) * 1000) / u64::from(burst.get()));
    let quota = Quota::with_period(period)
        .ok_or_else(|| AppError::ConfigError(anyhow::anyhow!("rate limit window too small")))?
        .allow_burst(burst);

    Ok(Arc::new(RateLimiter::dashmap(quota)))
}

fn client_ip(request: &Request) -> Option<IpAddr> {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

pub async fn ip_rate_limit_middleware(
    State(limiter): State<IpRateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(ip) = client_ip(&request) else {
        tracing::warn!("Could not determine client IP for rate limiting");
        return Ok(next.run(request).await);
    };

    match limiter.check_key(&ip) {
        Ok(_) => Ok(next.run(request).await),
        Err(negative) => {
            let wait_time = negative.wait_time_from(DefaultClock::default().now());
            metrics::counter!("rate_limited_requests_total").increment(1);
            Err(AppError::TooManyRequests(
                "Too many requests from this IP. Please try again later.".to_string(),
                Some(wait_time.as_secs().max(1)),
            ))
        }
    }
}
