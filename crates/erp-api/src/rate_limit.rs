//! Per-client request budget for everything under `/api`.
//!
//! Clients are keyed by the first `X-Forwarded-For` hop, then `X-Real-IP`,
//! then the peer address when the server was started with connect info.
//! Requests over budget get `429` and never reach a handler.

use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};

use axum::{
  Json,
  extract::{ConnectInfo, Request},
  http::StatusCode,
  middleware::Next,
  response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;

/// Tracked clients above which idle entries are swept on the next check.
const SWEEP_ABOVE: usize = 10_000;

/// A shared, keyed GCRA limiter: `requests` may arrive back to back, then one
/// more is allowed every `window / requests`.
#[derive(Clone)]
pub struct RateLimit {
  limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl RateLimit {
  /// `None` if `requests` or `window` is zero.
  pub fn new(requests: u32, window: Duration) -> Option<Self> {
    let burst = NonZeroU32::new(requests)?;
    let quota = Quota::with_period(window / requests)?.allow_burst(burst);
    Some(Self { limiter: Arc::new(RateLimiter::keyed(quota)) })
  }

  /// Spend one request from `client`'s budget. Returns whether it was allowed.
  pub fn check(&self, client: &str) -> bool {
    if self.limiter.len() > SWEEP_ABOVE {
      self.limiter.retain_recent();
    }
    self.limiter.check_key(&client.to_owned()).is_ok()
  }
}

fn client_ip(req: &Request) -> String {
  let header = |name: &str| {
    req
      .headers()
      .get(name)
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty())
  };

  if let Some(hop) = header("x-forwarded-for").and_then(|v| v.split(',').next()) {
    return hop.trim().to_owned();
  }
  if let Some(ip) = header("x-real-ip") {
    return ip.to_owned();
  }
  req
    .extensions()
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip().to_string())
    .unwrap_or_else(|| "unknown".to_owned())
}

/// Middleware body; wire it with `axum::middleware::from_fn`.
pub async fn enforce(rate: RateLimit, req: Request, next: Next) -> Response {
  let client = client_ip(&req);
  if !rate.check(&client) {
    tracing::warn!(%client, path = %req.uri().path(), "rate limit exceeded");
    return (
      StatusCode::TOO_MANY_REQUESTS,
      Json(json!({
        "message": "Too many requests from this IP, please try again later."
      })),
    )
      .into_response();
  }
  next.run(req).await
}
