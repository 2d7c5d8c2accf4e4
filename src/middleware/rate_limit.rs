// SPDX-License-Identifier: MIT

//! Fixed-window per-IP rate limiting: 100 requests per 15 minutes.
//!
//! Requests are keyed on the socket peer address. `x-forwarded-for` is
//! honored only when the deployment declares a trusted proxy in front
//! of the server; the header is client-controlled otherwise and would
//! let a direct caller rotate identities past the cap.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const MAX_REQUESTS_PER_WINDOW: u32 = 100;
pub const WINDOW: Duration = Duration::from_secs(15 * 60);

struct Window {
    started: Instant,
    count: u32,
}

/// Per-IP fixed-window counters.
pub struct RateLimiter {
    windows: DashMap<IpAddr, Window>,
    max_requests: u32,
    window: Duration,
    last_sweep: Mutex<Instant>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MAX_REQUESTS_PER_WINDOW, WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Record a hit for `ip`; false once the window's budget is spent.
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        self.sweep(now);

        let mut entry = self.windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        entry.count += 1;
        entry.count <= self.max_requests
    }

    /// Drop windows whose period has elapsed, at most once per window,
    /// so the map stays bounded by the number of recently-seen addresses.
    fn sweep(&self, now: Instant) {
        let mut last = match self.last_sweep.try_lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if now.duration_since(*last) < self.window {
            return;
        }
        *last = now;
        let window = self.window;
        self.windows
            .retain(|_, entry| now.duration_since(entry.started) < window);
    }

    #[cfg(test)]
    fn tracked_addresses(&self) -> usize {
        self.windows.len()
    }
}

fn client_ip(request: &Request, trust_proxy: bool) -> Option<IpAddr> {
    if trust_proxy {
        if let Some(forwarded) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
        {
            if let Some(first) = forwarded.split(',').next() {
                if let Ok(ip) = first.trim().parse() {
                    return Some(ip);
                }
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

/// Middleware enforcing the per-IP request cap.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(ip) = client_ip(&request, state.config.trust_proxy) {
        if !state.rate_limiter.check(ip) {
            tracing::warn!(%ip, "Rate limit exceeded");
            return Err(AppError::RateLimited);
        }
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn budget_is_enforced() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let ip: IpAddr = "10.0.0.1".parse().unwrap();

        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
        assert!(limiter.check(ip));
        assert!(!limiter.check(ip));
    }

    #[test]
    fn window_reset_restores_budget() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));
        let ip: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(ip));
        assert!(!limiter.check(ip));

        std::thread::sleep(Duration::from_millis(15));
        assert!(limiter.check(ip));
    }

    #[test]
    fn addresses_are_tracked_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let a: IpAddr = "10.0.0.3".parse().unwrap();
        let b: IpAddr = "10.0.0.4".parse().unwrap();

        assert!(limiter.check(a));
        assert!(!limiter.check(a));
        assert!(limiter.check(b));
    }

    #[test]
    fn elapsed_windows_are_evicted() {
        let limiter = RateLimiter::new(5, Duration::from_millis(10));
        for n in 0..20u8 {
            limiter.check(IpAddr::from([10, 0, 1, n]));
        }
        assert_eq!(limiter.tracked_addresses(), 20);

        std::thread::sleep(Duration::from_millis(15));
        limiter.check("10.0.2.1".parse().unwrap());

        // The sweep dropped every elapsed window; only the fresh one stays.
        assert_eq!(limiter.tracked_addresses(), 1);
    }

    fn request_from(peer: &str, forwarded: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = forwarded {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        request
    }

    #[test]
    fn forwarded_header_is_ignored_without_a_trusted_proxy() {
        let request = request_from("192.0.2.1:4242", Some("198.51.100.7"));
        assert_eq!(
            client_ip(&request, false),
            Some("192.0.2.1".parse().unwrap())
        );
    }

    #[test]
    fn forwarded_header_wins_behind_a_trusted_proxy() {
        let request = request_from("192.0.2.1:4242", Some("198.51.100.7, 10.0.0.1"));
        assert_eq!(
            client_ip(&request, true),
            Some("198.51.100.7".parse().unwrap())
        );
    }

    #[test]
    fn trusted_proxy_falls_back_to_the_peer_without_the_header() {
        let request = request_from("192.0.2.1:4242", None);
        assert_eq!(
            client_ip(&request, true),
            Some("192.0.2.1".parse().unwrap())
        );
    }
}
