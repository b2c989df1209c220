use reqwest::StatusCode;
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::header::HeaderMap;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not connect to {url} after {attempts} attempts")]
    Connect {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("gave up on {url} after {attempts} attempts: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last: String,
    },
    #[error("{url} returned HTTP {status}{}", with_detail(.detail))]
    Status {
        url: String,
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn with_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

enum Failure {
    Transient(reqwest::Error),
    Throttled {
        status: StatusCode,
        delay: Option<Duration>,
    },
}

impl Failure {
    fn describe(&self) -> String {
        match self {
            Failure::Transient(err) => err.to_string(),
            Failure::Throttled { status, .. } => format!("HTTP {status}"),
        }
    }
}

pub fn send_with_retry<F>(
    url: &str,
    policy: &RetryPolicy,
    mut build: F,
) -> Result<Response, FetchError>
where
    F: FnMut() -> RequestBuilder,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;
    loop {
        attempt += 1;
        let failure = match build().send() {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }
                if !is_retryable(status) {
                    return Err(status_error(url, response));
                }
                let delay = retry_delay_from_headers(response.headers());
                Failure::Throttled { status, delay }
            }
            Err(err) if is_transient(&err) => Failure::Transient(err),
            Err(source) => {
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    source,
                });
            }
        };

        if attempt >= max_attempts {
            return Err(match failure {
                Failure::Transient(source) if source.is_connect() => FetchError::Connect {
                    url: url.to_string(),
                    attempts: attempt,
                    source,
                },
                other => FetchError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last: other.describe(),
                },
            });
        }

        let delay = match &failure {
            Failure::Throttled {
                delay: Some(delay), ..
            } => *delay,
            _ => policy.delay,
        };
        warn!(
            url,
            attempt,
            max_attempts,
            reason = %failure.describe(),
            delay_ms = delay_millis(delay),
            "retrying request"
        );
        thread::sleep(delay);
    }
}

fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

fn status_error(url: &str, response: Response) -> FetchError {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    if !body.is_empty() {
        info!(url, %status, body = %body, "error response");
    }
    FetchError::Status {
        url: url.to_string(),
        status,
        detail: error_message(&body),
    }
}

fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|message| message.as_str())
        .map(ToString::to_string)
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
    )
}

fn retry_delay_from_headers(headers: &HeaderMap) -> Option<Duration> {
    if let Some(delay) = retry_after_seconds(headers) {
        return Some(Duration::from_secs(delay));
    }
    if let Some(delay) = ratelimit_reset_seconds(headers) {
        return Some(Duration::from_secs(delay));
    }
    None
}

fn retry_after_seconds(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
}

fn ratelimit_reset_seconds(headers: &HeaderMap) -> Option<u64> {
    let reset = headers
        .get("x-ratelimit-reset")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    if reset <= now {
        None
    } else {
        Some(reset - now)
    }
}
