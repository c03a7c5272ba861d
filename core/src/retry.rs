//! Fixed-delay retry loop.
//!
//! Every failure is retried the same way: wait `delay`, try again, until
//! `max_attempts` attempts have been made. Only the last error survives.

use std::time::Duration;

/// How many times to attempt a request and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause after each failed attempt that is followed by another one.
    pub delay: Duration,
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self { delay, max_attempts }
    }

    /// Number of attempts actually made; a zero budget still runs once.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Runs `f` until it succeeds or the policy's attempts are used up.
///
/// `f` receives the 1-based attempt number. `sleep` is called with the
/// policy delay between attempts, never after the final one.
pub fn run_with_retry<T, E, S, F>(policy: &RetryPolicy, mut sleep: S, mut f: F) -> Result<T, E>
where
    S: FnMut(Duration),
    F: FnMut(u32) -> Result<T, E>,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(_) => {
                tracing::debug!(attempt, max_attempts, "attempt failed, retrying");
                sleep(policy.delay);
                attempt += 1;
            }
        }
    }
}
