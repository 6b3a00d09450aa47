//! In-memory sliding-window rate limiter keyed by client IP.
//!
//! State is per process: it does not survive restarts and is not shared
//! between instances.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::infrastructure::config::RateLimitConfig;

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hits: DashMap<IpAddr, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window,
            hits: DashMap::new(),
        }
    }

    /// Record a hit for `ip`; returns false once the window is full
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    pub fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut entry = self.hits.entry(ip).or_default();
        entry.retain(|t| now.saturating_duration_since(*t) < self.window);

        if entry.len() >= self.max_requests {
            return false;
        }
        entry.push(now);
        true
    }

    /// Drop keys whose hits have all aged out of the window
    pub fn prune(&self, now: Instant) {
        self.hits.retain(|_, hits| {
            hits.retain(|t| now.saturating_duration_since(*t) < self.window);
            !hits.is_empty()
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.hits.len()
    }
}
