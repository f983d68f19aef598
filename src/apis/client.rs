/// HTTP client and the retrying Requester shared by every provider adapter
use crate::apis::rate_limiter::RateLimiter;
use crate::apis::stats::StatsTracker;
use crate::errors::{ResolverError, ResolverResult};
use crate::logger::{self, LogTag};
use rand::Rng;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// HTTP client wrapper with a default per-request timeout
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> ResolverResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolverError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// One outbound request, rebuilt for every attempt
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    fn build(&self, client: &Client) -> reqwest::RequestBuilder {
        let mut builder = client.request(self.method.clone(), &self.url);
        for (name, value) in &self.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = &self.body {
            builder = builder.json(body);
        }
        builder
    }
}

/// Attempt budget and backoff schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Extra random delay as a fraction of the backoff, 0.0 disables
    pub jitter_ratio: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, jitter_ratio: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            jitter_ratio: jitter_ratio.clamp(0.0, 1.0),
        }
    }

    /// Delay before retry `n` (1-based): base, 2x base, 4x base, ...
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << exponent);

        if self.jitter_ratio > 0.0 {
            let max_jitter = delay.as_secs_f64() * self.jitter_ratio;
            let jitter = rand::thread_rng().gen_range(0.0..=max_jitter);
            delay + Duration::from_secs_f64(jitter)
        } else {
            delay
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), 0.0)
    }
}

/// Retrying HTTP caller
///
/// Every attempt takes one token from the caller's limiter. A 2xx body is
/// decoded and returned, a 404 is a terminal `Ok(None)`, anything else is
/// a transient failure retried until the attempt budget runs out. An empty or
/// `null` 2xx body is a decided miss. Stats are recorded once per
/// call, for the attempt that decided the outcome.
pub struct Requester {
    http: HttpClient,
    policy: RetryPolicy,
    stats: Arc<StatsTracker>,
}

enum AttemptOutcome<T> {
    Decided(Option<T>),
    Failed(ResolverError),
}

impl Requester {
    pub fn new(http: HttpClient, policy: RetryPolicy, stats: Arc<StatsTracker>) -> Self {
        Self {
            http,
            policy,
            stats,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn stats(&self) -> &Arc<StatsTracker> {
        &self.stats
    }

    pub async fn call<T>(
        &self,
        provider: &str,
        limiter: &RateLimiter,
        request: &ApiRequest,
    ) -> ResolverResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut last_error = String::new();

        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                let delay = self.policy.backoff(attempt);
                logger::debug(
                    LogTag::Api,
                    &format!(
                        "{} retry {}/{} in {}ms after: {}",
                        provider,
                        attempt,
                        self.policy.max_attempts - 1,
                        delay.as_millis(),
                        last_error
                    ),
                );
                tokio::time::sleep(delay).await;
            }

            limiter.acquire().await;
            let start = Instant::now();
            let outcome = self.attempt::<T>(provider, request).await;
            let latency = start.elapsed();

            match outcome {
                AttemptOutcome::Decided(value) => {
                    self.stats.record(provider, true, latency);
                    return Ok(value);
                }
                AttemptOutcome::Failed(err) => {
                    let retryable = err.is_recoverable();
                    if !retryable || attempt + 1 == self.policy.max_attempts {
                        self.stats.record(provider, false, latency);
                    }
                    if !retryable {
                        return Err(err);
                    }
                    last_error = match err {
                        ResolverError::Transient { message, .. } => message,
                        other => other.to_string(),
                    };
                }
            }
        }

        logger::warning(
            LogTag::Api,
            &format!(
                "{} failed after {} attempts: {}",
                provider, self.policy.max_attempts, last_error
            ),
        );

        Err(ResolverError::Exhausted {
            provider: provider.to_string(),
            attempts: self.policy.max_attempts,
            last_error,
        })
    }

    /// Single attempt reachability check. Never errors.
    ///
    /// Any answer below 500 means the provider is up: probes ask about
    /// records that may not exist, and a 404 is a decided answer.
    pub async fn probe(
        &self,
        provider: &str,
        limiter: &RateLimiter,
        request: &ApiRequest,
        timeout: Duration,
    ) -> bool {
        limiter.acquire().await;
        let response = request.build(self.http.client()).timeout(timeout).send().await;

        match response {
            Ok(response) if !response.status().is_server_error() => true,
            Ok(response) => {
                logger::debug(
                    LogTag::Api,
                    &format!("{} health probe returned HTTP {}", provider, response.status()),
                );
                false
            }
            Err(e) => {
                logger::debug(
                    LogTag::Api,
                    &format!("{} health probe failed: {}", provider, e),
                );
                false
            }
        }
    }

    async fn attempt<T>(&self, provider: &str, request: &ApiRequest) -> AttemptOutcome<T>
    where
        T: DeserializeOwned,
    {
        let response = match request.build(self.http.client()).send().await {
            Ok(response) => response,
            Err(e) => {
                return AttemptOutcome::Failed(ResolverError::transient(
                    provider,
                    format!("request failed: {}", e),
                ))
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return AttemptOutcome::Decided(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return AttemptOutcome::Failed(ResolverError::transient(
                provider,
                format!("HTTP {}: {}", status, snippet),
            ));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                return AttemptOutcome::Failed(ResolverError::transient(
                    provider,
                    format!("body read failed: {}", e),
                ))
            }
        };
        decode_body(provider, &body)
    }
}

/// An empty or `null` body is an answer with nothing in it
fn decode_body<T>(provider: &str, body: &[u8]) -> AttemptOutcome<T>
where
    T: DeserializeOwned,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return AttemptOutcome::Decided(None);
    }

    match serde_json::from_slice::<Option<T>>(body) {
        Ok(value) => AttemptOutcome::Decided(value),
        Err(e) => AttemptOutcome::Failed(ResolverError::transient(
            provider,
            format!("parse error: {}", e),
        )),
    }
}
