//! Circuit breaker for upstream instance protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: instance assumed down, requests fail fast
//! - Half-Open: a limited number of probes test whether it recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= failure_threshold
//! Open → Half-Open: after cool_down
//! Half-Open → Closed: half_open_probes consecutive successes
//! Half-Open → Open: any probe fails
//! ```
//!
//! # Design Decisions
//! - Per-instance circuit breaker (not global)
//! - Fail fast in Open state (no upstream call)
//! - Half-Open admits at most `half_open_probes` calls per generation
//! - Every transition starts a new generation; outcomes of calls that
//!   started in an older generation are discarded
//! - `RateLimited` results are neutral: they say nothing about the instance
//! - A call cancelled mid-flight is neutral too, so an abandoned half-open
//!   probe cannot hold its slot forever

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;

use crate::endpoint::{DispatchError, Endpoint};
use crate::models::{Business, BusinessesRequest};
use crate::observability::metrics;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

/// Per-instance breaker configuration.
#[derive(Debug, Clone)]
pub struct BreakerSettings {
    /// Consecutive failures that open a closed breaker.
    pub failure_threshold: u32,
    /// Time an open breaker waits before probing.
    pub cool_down: Duration,
    /// Probes admitted in Half-Open; that many successes close the breaker.
    pub half_open_probes: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cool_down: Duration::from_secs(60),
            half_open_probes: 1,
        }
    }
}

/// Point-in-time view of a breaker, for the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub rejected: u64,
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Success,
    Failure,
    Neutral,
}

#[derive(Debug)]
struct Counts {
    state: BreakerState,
    generation: u64,
    consecutive_failures: u32,
    consecutive_successes: u32,
    probes_admitted: u32,
    open_until: Option<Instant>,
    rejected: u64,
}

/// Endpoint decorator tracking failures of one instance.
pub struct CircuitBreaker {
    instance: String,
    settings: BreakerSettings,
    counts: Mutex<Counts>,
    inner: Arc<dyn Endpoint>,
}

impl CircuitBreaker {
    pub fn new(instance: impl Into<String>, settings: BreakerSettings, inner: Arc<dyn Endpoint>) -> Self {
        Self {
            instance: instance.into(),
            settings,
            counts: Mutex::new(Counts {
                state: BreakerState::Closed,
                generation: 0,
                consecutive_failures: 0,
                consecutive_successes: 0,
                probes_admitted: 0,
                open_until: None,
                rejected: 0,
            }),
            inner,
        }
    }

    /// Current state; an expired Open breaker reports Half-Open.
    pub fn state(&self) -> BreakerState {
        self.snapshot().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let mut counts = self.lock();
        self.advance(&mut counts, Instant::now());
        BreakerSnapshot {
            state: counts.state,
            consecutive_failures: counts.consecutive_failures,
            consecutive_successes: counts.consecutive_successes,
            rejected: counts.rejected,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counts> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move Open → Half-Open once the cool-down has elapsed.
    fn advance(&self, counts: &mut Counts, now: Instant) {
        if counts.state == BreakerState::Open {
            if let Some(until) = counts.open_until {
                if now >= until {
                    self.transition(counts, BreakerState::HalfOpen, now);
                }
            }
        }
    }

    fn transition(&self, counts: &mut Counts, to: BreakerState, now: Instant) {
        let from = counts.state;
        counts.state = to;
        counts.generation += 1;
        counts.consecutive_failures = 0;
        counts.consecutive_successes = 0;
        counts.probes_admitted = 0;
        counts.open_until = match to {
            BreakerState::Open => Some(now + self.settings.cool_down),
            _ => None,
        };

        match to {
            BreakerState::Open => tracing::warn!(
                instance = %self.instance,
                from = from.as_str(),
                cool_down = ?self.settings.cool_down,
                "Circuit breaker opened"
            ),
            _ => tracing::info!(
                instance = %self.instance,
                from = from.as_str(),
                to = to.as_str(),
                "Circuit breaker state changed"
            ),
        }
        metrics::record_breaker_transition(&self.instance, to.as_str());
    }

    /// Admission check. Returns the generation the call belongs to.
    fn before_call(&self, now: Instant) -> Result<u64, DispatchError> {
        let mut counts = self.lock();
        self.advance(&mut counts, now);

        let admitted = match counts.state {
            BreakerState::Closed => true,
            BreakerState::Open => false,
            BreakerState::HalfOpen => {
                if counts.probes_admitted < self.settings.half_open_probes {
                    counts.probes_admitted += 1;
                    true
                } else {
                    false
                }
            }
        };

        if admitted {
            Ok(counts.generation)
        } else {
            counts.rejected += 1;
            Err(DispatchError::BreakerOpen {
                instance: self.instance.clone(),
            })
        }
    }

    fn after_call(&self, generation: u64, outcome: Outcome, now: Instant) {
        let mut counts = self.lock();
        self.advance(&mut counts, now);

        if counts.generation != generation {
            return;
        }

        match (counts.state, outcome) {
            (BreakerState::Closed, Outcome::Success) => {
                counts.consecutive_failures = 0;
            }
            (BreakerState::Closed, Outcome::Failure) => {
                counts.consecutive_failures += 1;
                if counts.consecutive_failures >= self.settings.failure_threshold {
                    self.transition(&mut counts, BreakerState::Open, now);
                }
            }
            (BreakerState::HalfOpen, Outcome::Success) => {
                counts.consecutive_successes += 1;
                if counts.consecutive_successes >= self.settings.half_open_probes {
                    self.transition(&mut counts, BreakerState::Closed, now);
                }
            }
            (BreakerState::HalfOpen, Outcome::Failure) => {
                self.transition(&mut counts, BreakerState::Open, now);
            }
            (BreakerState::HalfOpen, Outcome::Neutral) => {
                // give the probe slot back; the instance was never reached
                counts.probes_admitted = counts.probes_admitted.saturating_sub(1);
            }
            (BreakerState::Closed, Outcome::Neutral) | (BreakerState::Open, _) => {}
        }
    }
}

/// An admitted call. Dropped without an outcome (the caller cancelled the
/// call mid-flight), it is recorded as neutral so a half-open probe slot
/// is handed back.
struct Admission<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    settled: bool,
}

impl<'a> Admission<'a> {
    fn admit(breaker: &'a CircuitBreaker, now: Instant) -> Result<Self, DispatchError> {
        let generation = breaker.before_call(now)?;
        Ok(Self {
            breaker,
            generation,
            settled: false,
        })
    }

    fn settle(mut self, outcome: Outcome, now: Instant) {
        self.settled = true;
        self.breaker.after_call(self.generation, outcome, now);
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(instance = %self.breaker.instance, "Call dropped before completion");
            self.breaker.after_call(self.generation, Outcome::Neutral, Instant::now());
        }
    }
}

#[async_trait]
impl Endpoint for CircuitBreaker {
    async fn call(&self, request: BusinessesRequest) -> Result<Business, DispatchError> {
        let admission = Admission::admit(self, Instant::now())?;

        let result = self.inner.call(request).await;
        let outcome = match &result {
            Ok(_) => Outcome::Success,
            Err(e) if e.counts_against_instance() => Outcome::Failure,
            Err(_) => Outcome::Neutral,
        };
        admission.settle(outcome, Instant::now());

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::endpoint::testing::Scripted;

    fn breaker(threshold: u32, probes: u32, upstream: Arc<Scripted>) -> CircuitBreaker {
        CircuitBreaker::new(
            "pos-a",
            BreakerSettings {
                failure_threshold: threshold,
                cool_down: Duration::from_secs(30),
                half_open_probes: probes,
            },
            upstream,
        )
    }

    fn request() -> BusinessesRequest {
        BusinessesRequest::for_business("b1")
    }

    #[test]
    fn test_circuit_breaker_initial_state() {
        let cb = breaker(3, 1, Scripted::healthy("pos-a"));
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[tokio::test]
    async fn test_opens_exactly_at_threshold() {
        let upstream = Scripted::failing("pos-a");
        let cb = breaker(3, 1, upstream.clone());

        for _ in 0..2 {
            let _ = cb.call(request()).await;
            assert_eq!(cb.state(), BreakerState::Closed);
        }
        let _ = cb.call(request()).await;
        assert_eq!(cb.state(), BreakerState::Open);

        // Open: no further upstream calls
        for _ in 0..5 {
            let err = cb.call(request()).await.unwrap_err();
            assert!(matches!(err, DispatchError::BreakerOpen { .. }));
        }
        assert_eq!(upstream.calls(), 3);
        assert_eq!(cb.snapshot().rejected, 5);
    }

    #[test]
    fn test_success_resets_failure_streak() {
        let cb = breaker(2, 1, Scripted::healthy("pos-a"));
        let now = Instant::now();

        let g = cb.before_call(now).unwrap();
        cb.after_call(g, Outcome::Failure, now);
        let g = cb.before_call(now).unwrap();
        cb.after_call(g, Outcome::Success, now);
        let g = cb.before_call(now).unwrap();
        cb.after_call(g, Outcome::Failure, now);

        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[test]
    fn test_half_open_only_after_cool_down() {
        let cb = breaker(1, 1, Scripted::healthy("pos-a"));
        let start = Instant::now();

        let g = cb.before_call(start).unwrap();
        cb.after_call(g, Outcome::Failure, start);

        assert!(cb.before_call(start + Duration::from_secs(29)).is_err());
        assert!(cb.before_call(start + Duration::from_secs(30)).is_ok());
        assert_eq!(cb.lock().state, BreakerState::HalfOpen);
    }

    #[test]
    fn test_half_open_admits_probe_quota() {
        let cb = breaker(1, 2, Scripted::healthy("pos-a"));
        let start = Instant::now();
        let g = cb.before_call(start).unwrap();
        cb.after_call(g, Outcome::Failure, start);

        let probe_time = start + Duration::from_secs(31);
        let p1 = cb.before_call(probe_time).unwrap();
        let p2 = cb.before_call(probe_time).unwrap();
        assert!(cb.before_call(probe_time).is_err());

        cb.after_call(p1, Outcome::Success, probe_time);
        assert_eq!(cb.lock().state, BreakerState::HalfOpen);
        cb.after_call(p2, Outcome::Success, probe_time);
        assert_eq!(cb.lock().state, BreakerState::Closed);
    }

    #[test]
    fn test_failed_probe_reopens_and_restarts_cool_down() {
        let cb = breaker(1, 1, Scripted::healthy("pos-a"));
        let start = Instant::now();
        let g = cb.before_call(start).unwrap();
        cb.after_call(g, Outcome::Failure, start);

        let probe_time = start + Duration::from_secs(30);
        let probe = cb.before_call(probe_time).unwrap();
        cb.after_call(probe, Outcome::Failure, probe_time);
        assert_eq!(cb.lock().state, BreakerState::Open);

        assert!(cb.before_call(probe_time + Duration::from_secs(29)).is_err());
        assert!(cb.before_call(probe_time + Duration::from_secs(30)).is_ok());
    }

    #[test]
    fn test_neutral_probe_returns_its_slot() {
        let cb = breaker(1, 1, Scripted::healthy("pos-a"));
        let start = Instant::now();
        let g = cb.before_call(start).unwrap();
        cb.after_call(g, Outcome::Failure, start);

        let probe_time = start + Duration::from_secs(30);
        let probe = cb.before_call(probe_time).unwrap();
        cb.after_call(probe, Outcome::Neutral, probe_time);

        assert_eq!(cb.lock().state, BreakerState::HalfOpen);
        assert!(cb.before_call(probe_time).is_ok());
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let cb = breaker(2, 1, Scripted::healthy("pos-a"));
        let now = Instant::now();

        let slow = cb.before_call(now).unwrap();
        let g1 = cb.before_call(now).unwrap();
        let g2 = cb.before_call(now).unwrap();
        cb.after_call(g1, Outcome::Failure, now);
        cb.after_call(g2, Outcome::Failure, now);
        assert_eq!(cb.lock().state, BreakerState::Open);

        // A success from a call started while Closed does not close the breaker.
        cb.after_call(slow, Outcome::Success, now);
        assert_eq!(cb.lock().state, BreakerState::Open);
    }

    #[tokio::test]
    async fn test_rate_limited_does_not_trip() {
        let limited = crate::endpoint::endpoint_fn(|_req: BusinessesRequest| async {
            Err::<Business, _>(DispatchError::RateLimited { instance: "pos-a".into() })
        });
        let cb = CircuitBreaker::new(
            "pos-a",
            BreakerSettings { failure_threshold: 1, ..Default::default() },
            Arc::new(limited),
        );

        for _ in 0..3 {
            let err = cb.call(request()).await.unwrap_err();
            assert!(matches!(err, DispatchError::RateLimited { .. }));
        }
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[tokio::test]
    async fn test_cancelled_probe_releases_its_slot() {
        use std::sync::atomic::{AtomicBool, Ordering};

        use crate::endpoint::{endpoint_fn, testing::business};

        let hang = Arc::new(AtomicBool::new(false));
        let switch = hang.clone();
        let upstream = endpoint_fn(move |req: BusinessesRequest| {
            let hang = switch.load(Ordering::SeqCst);
            async move {
                if hang {
                    std::future::pending::<()>().await;
                }
                Ok::<_, DispatchError>(business(&req.business_id, "pos-a"))
            }
        });
        let cb = CircuitBreaker::new(
            "pos-a",
            BreakerSettings {
                failure_threshold: 1,
                cool_down: Duration::from_millis(20),
                half_open_probes: 1,
            },
            Arc::new(upstream),
        );

        let g = cb.before_call(Instant::now()).unwrap();
        cb.after_call(g, Outcome::Failure, Instant::now());
        tokio::time::sleep(Duration::from_millis(30)).await;

        // The probe hangs and the caller gives up on it.
        hang.store(true, Ordering::SeqCst);
        assert!(tokio::time::timeout(Duration::from_millis(10), cb.call(request())).await.is_err());
        assert_eq!(cb.state(), BreakerState::HalfOpen);
        assert_eq!(cb.lock().probes_admitted, 0);

        // The next probe is admitted and closes the breaker.
        hang.store(false, Ordering::SeqCst);
        assert!(cb.call(request()).await.is_ok());
        assert_eq!(cb.state(), BreakerState::Closed);
    }
}
