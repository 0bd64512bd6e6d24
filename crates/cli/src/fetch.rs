//! Sheet download with retry and exponential backoff.
//!
//! Status classification:
//! - 2xx: body returned as text (a leading BOM is kept for the CSV loader).
//! - 4xx other than 429: rejected, fails immediately.
//! - 429, 5xx, network and timeout errors: retried until the attempt
//!   budget is spent, waiting `initial_delay` and doubling each time.

use std::thread;
use std::time::Duration;

use dexsync_recon::FetchConfig;

use crate::exit_codes::{EXIT_FETCH_UPSTREAM, EXIT_FETCH_VALIDATION, EXIT_SYNC_RUNTIME};
use crate::CliError;

const USER_AGENT: &str = concat!("dexsync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
        }
    }
}

/// Failure of a single attempt.
enum AttemptError {
    Rejected(u16),
    Retryable(String),
}

pub struct SheetClient {
    http: reqwest::blocking::Client,
    policy: RetryPolicy,
}

impl SheetClient {
    pub fn new(config: &FetchConfig) -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CliError {
                code: EXIT_SYNC_RUNTIME,
                message: format!("cannot build HTTP client: {e}"),
                hint: None,
            })?;

        Ok(Self {
            http,
            policy: RetryPolicy::from_config(config),
        })
    }

    /// GET `url` and return the body as text.
    pub fn fetch_csv(&self, url: &str) -> Result<String, CliError> {
        let mut delay = self.policy.initial_delay;
        let mut last_error = String::new();

        for attempt in 1..=self.policy.max_attempts {
            match self.attempt(url) {
                Ok(body) => {
                    tracing::debug!(bytes = body.len(), attempt, "downloaded sheet");
                    return Ok(body);
                }
                Err(AttemptError::Rejected(status)) => {
                    return Err(CliError {
                        code: EXIT_FETCH_VALIDATION,
                        message: format!("sheet request rejected (HTTP {status})"),
                        hint: Some("check that the sheet is published to the web as CSV".into()),
                    });
                }
                Err(AttemptError::Retryable(reason)) => {
                    last_error = reason;
                    if attempt == self.policy.max_attempts {
                        break;
                    }
                    tracing::warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        reason = %last_error,
                        "sheet download failed, retrying"
                    );
                    thread::sleep(delay);
                    delay *= 2;
                }
            }
        }

        Err(CliError {
            code: EXIT_FETCH_UPSTREAM,
            message: format!(
                "sheet download failed after {} attempts: {}",
                self.policy.max_attempts, last_error
            ),
            hint: Some("use --csv to run against a local export".into()),
        })
    }

    fn attempt(&self, url: &str) -> Result<String, AttemptError> {
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| AttemptError::Retryable(e.to_string()))?;

        let status = resp.status().as_u16();
        if status == 429 || status >= 500 {
            return Err(AttemptError::Retryable(format!("HTTP {status}")));
        }
        if status >= 400 {
            return Err(AttemptError::Rejected(status));
        }

        resp.text()
            .map_err(|e| AttemptError::Retryable(format!("cannot read body: {e}")))
    }
}
