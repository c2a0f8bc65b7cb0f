//! Consumer-side connection retry.
//!
//! The companion needs a moment after launch before the region exists, so a
//! missing region is retried a bounded number of times with a fixed delay.
//! Every other failure is final on the first attempt.

use crate::error::{KinectError, Result};
use log::{debug, warn};
use std::thread;
use std::time::Duration;

pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_CONNECT_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_CONNECT_ATTEMPTS,
            delay: DEFAULT_CONNECT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Upper bound on time spent sleeping between attempts.
    pub fn ceiling(&self) -> Duration {
        self.delay * self.attempts
    }
}

/// Runs `attempt` until it succeeds, fails with something other than
/// "not found", or the policy runs out. No sleep follows the final attempt.
pub fn retry_open<T>(
    name: &str,
    policy: &RetryPolicy,
    mut attempt: impl FnMut() -> Result<T>,
) -> Result<T> {
    let attempts = policy.attempts.max(1);

    for n in 1..=attempts {
        match attempt() {
            Ok(value) => {
                if n > 1 {
                    debug!("Opened '{}' on attempt {}/{}", name, n, attempts);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() => {
                debug!("'{}' not found yet (attempt {}/{})", name, n, attempts);
                if n < attempts {
                    thread::sleep(policy.delay);
                }
            }
            Err(e) => {
                warn!("Giving up on '{}': {}", name, e);
                return Err(e);
            }
        }
    }

    Err(KinectError::ChannelNotFound {
        name: name.to_string(),
        attempts,
    })
}
