//! Retrying HTTP transport
//!
//! Sends a built [`OcrRequest`] to the configured endpoint, classifies each
//! attempt, and retries transient failures (timeouts, network errors, 5xx)
//! with exponential backoff. Client errors (4xx), unexpected statuses and
//! oversized response bodies are returned after the first attempt.

use crate::config::ClientConfig;
use crate::error::OcrError;
use crate::request::OcrRequest;
use std::time::Duration;
use ureq::tls::TlsConfig;
use ureq::Agent;

/// Delay before the second attempt; doubles for each further attempt
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Largest response body accepted from the service (64 MiB)
pub const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

/// A 2xx response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Classification of a single attempt
#[derive(Debug)]
enum Attempt {
    Success(HttpResponse),
    Retryable(String),
    Permanent(OcrError),
}

/// Backoff schedule for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_count: u32,
    pub base: Duration,
}

impl RetryPolicy {
    pub fn new(retry_count: u32) -> Self {
        Self {
            retry_count,
            base: DEFAULT_BACKOFF_BASE,
        }
    }

    pub fn with_base(mut self, base: Duration) -> Self {
        self.base = base;
        self
    }

    /// Sleep before the attempt following `attempt` (0-based): `base * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor)
    }

    /// Total attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }
}

/// HTTP transport bound to one client configuration
pub struct Transport {
    agent: Agent,
    endpoint: String,
    timeout_secs: u64,
    policy: RetryPolicy,
    max_response_bytes: u64,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Self {
        let timeout = Some(Duration::from_secs(config.timeout_secs));

        let mut builder = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(timeout)
            .timeout_send_request(timeout)
            .timeout_send_body(timeout)
            .timeout_recv_response(timeout)
            .timeout_recv_body(timeout);

        if !config.verify_ssl {
            tracing::warn!(
                "TLS certificate verification disabled for {}",
                config.endpoint
            );
            builder = builder.tls_config(TlsConfig::builder().disable_verification(true).build());
        }

        let agent: Agent = builder.build().into();

        Self {
            agent,
            endpoint: config.endpoint.clone(),
            timeout_secs: config.timeout_secs,
            policy: RetryPolicy::new(config.retry_count),
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.policy = self.policy.with_base(base);
        self
    }

    pub fn with_max_response_bytes(mut self, limit: u64) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// Send `request`, retrying transient failures per the retry policy
    pub fn send(&self, request: &OcrRequest) -> Result<HttpResponse, OcrError> {
        let body = request.body()?;
        let max_attempts = self.policy.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            tracing::debug!(
                "Making REST OCR request to {} (attempt {}/{})",
                self.endpoint,
                attempt + 1,
                max_attempts
            );

            let last_error = match self.attempt(request, &body) {
                Attempt::Success(response) => return Ok(response),
                Attempt::Permanent(err) => {
                    tracing::warn!("{}", err);
                    return Err(err);
                }
                Attempt::Retryable(message) => message,
            };

            tracing::warn!("{}", last_error);

            if attempt >= self.policy.retry_count {
                return Err(OcrError::RetryExhausted {
                    endpoint: self.endpoint.clone(),
                    attempts: attempt + 1,
                    last_error,
                });
            }

            let delay = self.policy.delay_for(attempt);
            tracing::info!("Retrying in {:?}...", delay);
            std::thread::sleep(delay);
            attempt += 1;
        }
    }

    fn attempt(&self, request: &OcrRequest, body: &[u8]) -> Attempt {
        let mut builder = self.agent.post(self.endpoint.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        match builder.send(body) {
            Ok(response) => {
                let status = response.status().as_u16();
                let text = match response
                    .into_body()
                    .with_config()
                    .limit(self.max_response_bytes)
                    .read_to_string()
                {
                    Ok(text) => text,
                    Err(e) => return self.transport_failure(e),
                };
                classify(status, text, &self.endpoint)
            }
            Err(e) => self.transport_failure(e),
        }
    }

    fn transport_failure(&self, err: ureq::Error) -> Attempt {
        match err {
            ureq::Error::Timeout(_) => Attempt::Retryable(format!(
                "REST OCR request timed out after {} seconds",
                self.timeout_secs
            )),
            // Bad header names or values never succeed on a retry.
            ureq::Error::Http(e) => {
                Attempt::Permanent(OcrError::InvalidRequest(e.to_string()))
            }
            ureq::Error::BodyExceedsLimit(_) => Attempt::Permanent(OcrError::ResponseTooLarge {
                endpoint: self.endpoint.clone(),
                max: self.max_response_bytes,
            }),
            other => Attempt::Retryable(format!("REST OCR request failed: {}", other)),
        }
    }
}

fn classify(status: u16, body: String, endpoint: &str) -> Attempt {
    match status {
        200..=299 => Attempt::Success(HttpResponse { status, body }),
        400..=499 => Attempt::Permanent(OcrError::ClientError {
            status,
            endpoint: endpoint.to_string(),
            body,
        }),
        500..=599 => {
            let excerpt: String = body.trim().chars().take(200).collect();
            if excerpt.is_empty() {
                Attempt::Retryable(format!("REST OCR API returned HTTP error: {}", status))
            } else {
                Attempt::Retryable(format!(
                    "REST OCR API returned HTTP error: {} - {}",
                    status, excerpt
                ))
            }
        }
        _ => Attempt::Permanent(OcrError::UnexpectedStatus {
            status,
            endpoint: endpoint.to_string(),
        }),
    }
}
