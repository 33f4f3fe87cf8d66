//! Fixed-window request counter keyed by endpoint and caller.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Expired windows are swept once the table grows past this many entries,
/// at most once per window length.
const PRUNE_THRESHOLD: usize = 4_096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Resistance,
    Freshness,
    Trajectory,
    Portfolio,
    Cascade,
    Confidence,
    Calibration,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Resistance => "resistance",
            Endpoint::Freshness => "freshness",
            Endpoint::Trajectory => "trajectory",
            Endpoint::Portfolio => "portfolio",
            Endpoint::Cascade => "cascade",
            Endpoint::Confidence => "confidence",
            Endpoint::Calibration => "calibration",
        }
    }

    pub fn limit(&self, config: &RateLimitConfig) -> u32 {
        match self {
            Endpoint::Resistance => config.resistance,
            Endpoint::Freshness => config.freshness,
            Endpoint::Trajectory => config.trajectory,
            Endpoint::Portfolio => config.portfolio,
            Endpoint::Cascade => config.cascade,
            Endpoint::Confidence => config.confidence,
            Endpoint::Calibration => config.calibration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    started: Instant,
    count: u32,
}

#[derive(Debug, Default)]
struct WindowTable {
    entries: HashMap<(Endpoint, String), WindowState>,
    last_sweep: Option<Instant>,
}

impl WindowTable {
    fn sweep_if_due(&mut self, now: Instant, window: Duration) {
        if self.entries.len() <= PRUNE_THRESHOLD {
            return;
        }
        let due = self
            .last_sweep
            .map_or(true, |last| now.saturating_duration_since(last) >= window);
        if !due {
            return;
        }
        self.entries
            .retain(|_, state| now.saturating_duration_since(state.started) < window);
        self.last_sweep = Some(now);
    }
}

/// In-process limiter. Counts reset when the window elapses; state is not
/// shared across processes.
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    config: RateLimitConfig,
    window: Duration,
    windows: Mutex<WindowTable>,
}

impl FixedWindowRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let window = Duration::from_secs(config.window_secs.max(1));
        Self {
            config,
            window,
            windows: Mutex::new(WindowTable::default()),
        }
    }

    pub fn check(&self, endpoint: Endpoint, caller: &str) -> RateLimitDecision {
        self.check_at(endpoint, caller, Instant::now())
    }

    pub fn check_at(&self, endpoint: Endpoint, caller: &str, now: Instant) -> RateLimitDecision {
        let limit = endpoint.limit(&self.config);
        let mut table = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        table.sweep_if_due(now, self.window);

        let state = table
            .entries
            .entry((endpoint, caller.to_string()))
            .or_insert(WindowState {
                started: now,
                count: 0,
            });

        if now.saturating_duration_since(state.started) >= self.window {
            state.started = now;
            state.count = 0;
        }

        if state.count >= limit {
            let elapsed = now.saturating_duration_since(state.started);
            return RateLimitDecision::Denied {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        state.count += 1;
        RateLimitDecision::Allowed {
            remaining: limit - state.count,
        }
    }

    pub fn tracked_windows(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(trajectory: u32) -> FixedWindowRateLimiter {
        FixedWindowRateLimiter::new(RateLimitConfig {
            trajectory,
            ..RateLimitConfig::default()
        })
    }

    #[test]
    fn denies_after_limit_within_window() {
        let limiter = limiter(2);
        let start = Instant::now();
        assert_eq!(
            limiter.check_at(Endpoint::Trajectory, "10.0.0.1", start),
            RateLimitDecision::Allowed { remaining: 1 }
        );
        assert!(limiter
            .check_at(Endpoint::Trajectory, "10.0.0.1", start)
            .is_allowed());
        let denied = limiter.check_at(
            Endpoint::Trajectory,
            "10.0.0.1",
            start + Duration::from_secs(15),
        );
        assert_eq!(
            denied,
            RateLimitDecision::Denied {
                retry_after: Duration::from_secs(45)
            }
        );
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = limiter(1);
        let start = Instant::now();
        assert!(limiter.check_at(Endpoint::Trajectory, "a", start).is_allowed());
        assert!(!limiter.check_at(Endpoint::Trajectory, "a", start).is_allowed());
        assert!(limiter
            .check_at(Endpoint::Trajectory, "a", start + Duration::from_secs(60))
            .is_allowed());
    }

    #[test]
    fn callers_and_endpoints_are_counted_separately() {
        let limiter = limiter(1);
        let now = Instant::now();
        assert!(limiter.check_at(Endpoint::Trajectory, "a", now).is_allowed());
        assert!(limiter.check_at(Endpoint::Trajectory, "b", now).is_allowed());
        assert!(limiter.check_at(Endpoint::Resistance, "a", now).is_allowed());
        assert!(!limiter.check_at(Endpoint::Trajectory, "a", now).is_allowed());
    }

    #[test]
    fn zero_limit_blocks_everything() {
        let limiter = limiter(0);
        assert!(!limiter.check(Endpoint::Trajectory, "a").is_allowed());
    }

    #[test]
    fn expired_windows_are_pruned() {
        let limiter = FixedWindowRateLimiter::new(RateLimitConfig::default());
        let start = Instant::now();
        for caller in 0..=PRUNE_THRESHOLD {
            limiter.check_at(Endpoint::Resistance, &caller.to_string(), start);
        }
        assert_eq!(limiter.tracked_windows(), PRUNE_THRESHOLD + 1);
        limiter.check_at(Endpoint::Resistance, "late", start + Duration::from_secs(61));
        assert_eq!(limiter.tracked_windows(), 1);
    }

    #[test]
    fn sweeps_run_at_most_once_per_window() {
        let limiter = FixedWindowRateLimiter::new(RateLimitConfig::default());
        let start = Instant::now();
        for caller in 0..=PRUNE_THRESHOLD {
            limiter.check_at(Endpoint::Resistance, &caller.to_string(), start);
        }

        // Sweeps but nothing has expired yet.
        limiter.check_at(Endpoint::Resistance, "x", start + Duration::from_secs(1));
        assert_eq!(limiter.tracked_windows(), PRUNE_THRESHOLD + 2);

        // Everything from `start` has expired, but the last sweep was too recent.
        limiter.check_at(
            Endpoint::Resistance,
            "y",
            start + Duration::from_millis(60_500),
        );
        assert_eq!(limiter.tracked_windows(), PRUNE_THRESHOLD + 3);

        limiter.check_at(Endpoint::Resistance, "z", start + Duration::from_secs(61));
        assert_eq!(limiter.tracked_windows(), 2);
    }
}
