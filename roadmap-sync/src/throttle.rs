//! Global request throttle shared by every remote worker.
//!
//! Two mechanisms:
//!
//! - a governor direct rate limiter metering the steady request rate, and
//! - a back-off gate: when the server throttles us, every worker waits until
//!   the gate opens again before sending anything.

use std::num::NonZeroU32;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use crate::error::RemoteError;

const MAX_BACKOFF: Duration = Duration::from_secs(60);

pub struct Throttle {
    limiter: Option<DefaultDirectRateLimiter>,
    gate: Mutex<Option<Instant>>,
    max_retries: u32,
    base_backoff: Duration,
}

impl Throttle {
    /// `requests_per_second == 0` disables the steady-rate limiter.
    pub fn new(requests_per_second: u32, max_retries: u32) -> Self {
        Throttle {
            limiter: NonZeroU32::new(requests_per_second)
                .map(|rate| RateLimiter::direct(Quota::per_second(rate))),
            gate: Mutex::new(None),
            max_retries,
            base_backoff: Duration::from_secs(1),
        }
    }

    /// No rate limit, no retries.
    pub fn unlimited() -> Self {
        Throttle::new(0, 0)
    }

    /// Base delay for exponential back-off when the server gives no hint.
    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.base_backoff = base;
        self
    }

    /// Run `op`, retrying after throttling responses up to `max_retries`.
    ///
    /// A server-hinted pause longer than the back-off cap is not waited out:
    /// the error is returned at once so no worker sleeps past the cap.
    pub fn run<T>(
        &self,
        mut op: impl FnMut() -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let mut attempt = 0u32;
        loop {
            self.acquire();
            match op() {
                Err(RemoteError::RateLimited { retry_after: Some(hint) }) if hint > MAX_BACKOFF => {
                    tracing::warn!(
                        "remote asks for a {}s pause; giving up on this request",
                        hint.as_secs()
                    );
                    return Err(RemoteError::RateLimited { retry_after: Some(hint) });
                }
                Err(RemoteError::RateLimited { retry_after }) if attempt < self.max_retries => {
                    let pause = retry_after.unwrap_or_else(|| self.backoff(attempt));
                    tracing::warn!(
                        "throttled by remote; pausing all requests for {:.1}s (retry {}/{})",
                        pause.as_secs_f64(),
                        attempt + 1,
                        self.max_retries
                    );
                    self.pause_all(pause);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF)
    }

    /// Close the gate for at least `pause`.
    pub fn pause_all(&self, pause: Duration) {
        let until = Instant::now() + pause;
        let mut gate = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        if gate.map_or(true, |current| current < until) {
            *gate = Some(until);
        }
    }

    /// Block until both the gate and the rate limiter allow one request.
    fn acquire(&self) {
        loop {
            let until = *self.gate.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(until) = until {
                let now = Instant::now();
                if until > now {
                    std::thread::sleep(until - now);
                    continue;
                }
            }

            let Some(limiter) = &self.limiter else { return };
            match limiter.check() {
                Ok(()) => return,
                Err(not_until) => {
                    std::thread::sleep(not_until.wait_time_from(DefaultClock::default().now()));
                }
            }
        }
    }
}
