//! Fixed-delay retry policy shared by metadata and data requests

use crate::error::{RemoteError, RemoteResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Outcome of a single failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// Non-success HTTP status
    Status(u16),
    /// Timeout or connection failure; retried like a 5xx
    Unreachable(String),
    /// Any other failure; not retried
    Fatal(String),
}

/// Bounded attempts with a fixed delay between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `attempts` is the total number of tries, clamped to at least one
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it succeeds, is rejected, or the attempts run out.
    ///
    /// 5xx statuses and unreachable errors are retried; 4xx and other
    /// statuses fail immediately with [`RemoteError::Rejected`].
    pub async fn run<T, F, Fut>(&self, url: &str, mut op: F) -> RemoteResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let last = match op().await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Status(status)) if (500..600).contains(&status) => {
                    format!("HTTP {}", status)
                }
                Err(AttemptError::Status(status)) => {
                    return Err(RemoteError::Rejected {
                        url: url.to_string(),
                        status,
                    })
                }
                Err(AttemptError::Unreachable(message)) => message,
                Err(AttemptError::Fatal(message)) => {
                    return Err(RemoteError::Transport {
                        url: url.to_string(),
                        message,
                    })
                }
            };

            if attempt >= self.attempts {
                return Err(RemoteError::Unavailable {
                    url: url.to_string(),
                    attempts: attempt,
                    last,
                });
            }

            log::warn!(
                "{} (try {}/{}), retrying in {}s: {}",
                last,
                attempt,
                self.attempts,
                self.delay.as_secs(),
                url
            );
            sleep(self.delay).await;
        }
    }
}
