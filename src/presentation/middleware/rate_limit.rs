//! Rate Limiting Middleware
//!
//! In-memory sliding window limiter for the login endpoint. Each client
//! identifier keeps the timestamps of its recent attempts; an attempt is
//! allowed while fewer than the limit fall inside the window.

use std::collections::VecDeque;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitSettings;
use crate::shared::error::AppError;
use crate::startup::AppState;

// ============================================================================
// Rate Limiter Implementation
// ============================================================================

/// Result of a rejected attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: u32,
    /// Seconds until the oldest attempt leaves the window
    pub retry_after: u64,
}

/// Sliding window rate limiter keyed by client identifier.
#[derive(Debug)]
pub struct RateLimiter {
    attempts: DashMap<String, VecDeque<Instant>>,
    limit: u32,
    window: Duration,
    trust_proxy_headers: bool,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            attempts: DashMap::new(),
            limit: limit.max(1),
            window,
            trust_proxy_headers: false,
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(
            settings.login_attempts,
            Duration::from_secs(settings.window_seconds),
        )
        .trusting_proxy_headers(settings.trust_proxy_headers)
    }

    /// Key clients on `X-Forwarded-For` / `X-Real-IP` instead of the peer.
    pub fn trusting_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Record an attempt for `identifier` if it is allowed.
    pub fn check(&self, identifier: &str) -> Result<(), RateLimitInfo> {
        self.check_at(identifier, Instant::now())
    }

    fn check_at(&self, identifier: &str, now: Instant) -> Result<(), RateLimitInfo> {
        let mut entry = self.attempts.entry(identifier.to_string()).or_default();
        let window = entry.value_mut();

        while let Some(&oldest) = window.front() {
            if now.duration_since(oldest) >= self.window {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() < self.limit as usize {
            window.push_back(now);
            return Ok(());
        }

        let retry_after = window
            .front()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or(self.window);
        // Round up so clients never retry a moment too early.
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        Err(RateLimitInfo {
            limit: self.limit,
            retry_after: secs.max(1),
        })
    }

    /// Drop identifiers with no attempt inside the window.
    pub fn purge_idle(&self) {
        let now = Instant::now();
        self.attempts.retain(|_, window| {
            window
                .back()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.attempts.len()
    }
}

// ============================================================================
// Identifier Extraction
// ============================================================================

/// Best guess at the client address.
///
/// Forwarding headers are client-controlled, so they are only read when a
/// trusted reverse proxy sets them. Priority when trusted:
/// 1. X-Forwarded-For header (first IP in the chain is the original client)
/// 2. X-Real-IP header
/// 3. Peer address of the connection
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trust_proxy_headers: bool,
) -> Option<IpAddr> {
    if !trust_proxy_headers {
        return peer;
    }
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok())
    };
    forwarded.or_else(real_ip).or(peer)
}

fn peer_ip(request: &Request) -> Option<IpAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
}

/// Rate limit key for a request.
fn extract_identifier(request: &Request, trust_proxy_headers: bool) -> String {
    match client_ip(request.headers(), peer_ip(request), trust_proxy_headers) {
        Some(ip) => format!("ip:{}", ip),
        None => {
            tracing::warn!("Could not determine client identifier for rate limiting");
            "ip:unknown".to_string()
        }
    }
}

// ============================================================================
// Middleware Functions
// ============================================================================

/// Rate limiting middleware for the login endpoint.
pub async fn rate_limit_login(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let identifier = extract_identifier(&request, state.login_limiter.trust_proxy_headers);

    match state.login_limiter.check(&identifier) {
        Ok(()) => next.run(request).await,
        Err(info) => {
            tracing::warn!(identifier = %identifier, "Login rate limit exceeded");
            let mut response = AppError::RateLimited {
                retry_after: info.retry_after,
            }
            .into_response();
            if let Ok(v) = HeaderValue::from_str(&info.limit.to_string()) {
                response.headers_mut().insert("X-RateLimit-Limit", v);
            }
            response
                .headers_mut()
                .insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
            response
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
