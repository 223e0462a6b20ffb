//! Shared `reqwest` plumbing for the Kupo and Ogmios clients.
//!
//! An [`HttpEndpoint`] owns one validated base URL, one connection pool and an
//! optional outbound rate limiter.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{header, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{CoreError, TransportError};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Connection settings shared by both backends.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Upper bound for a single HTTP exchange, independent of the
    /// per-method provider timeouts.
    pub request_timeout: Duration,
    /// Outbound requests per second per endpoint; `None` disables limiting.
    pub requests_per_second: Option<u32>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            requests_per_second: None,
        }
    }
}

pub(crate) struct HttpEndpoint {
    client: reqwest::Client,
    base_url: String,
    limiter: Option<DirectRateLimiter>,
}

impl HttpEndpoint {
    pub(crate) fn new(connection: &str, options: &HttpOptions) -> Result<Self, CoreError> {
        let base_url = parse_connection(connection)?;

        let client = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CoreError::Config(format!("build HTTP client: {e}")))?;

        let limiter = match options.requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::Config("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            base_url,
            limiter,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `path` (which starts with `/`, or is empty) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// GET `path` and return the body of a 2xx response.
    pub(crate) async fn get_ok(&self, path: &str) -> Result<String, CoreError> {
        self.wait_for_rate_limit().await;
        let url = self.url(path);
        debug!(http.method = "GET", http.url = %url, "http request");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(TransportError::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(TransportError::Http)?;
        debug!(http.url = %url, %status, body_len = body.len(), "http response");
        trace!(http.url = %url, body = %body, "http response body");

        if !status.is_success() {
            return Err(status_error(url, status, body));
        }
        Ok(body)
    }

    /// POST a JSON body to `path`. The status is returned alongside the body
    /// rather than enforced, so protocol-level errors can still be decoded.
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<(StatusCode, String), CoreError> {
        self.wait_for_rate_limit().await;
        let url = self.url(path);
        debug!(http.method = "POST", http.url = %url, "http request");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(TransportError::Http)?;
        let status = response.status();
        let body = response.text().await.map_err(TransportError::Http)?;
        debug!(http.url = %url, %status, body_len = body.len(), "http response");
        trace!(http.url = %url, body = %body, "http response body");

        Ok((status, body))
    }
}

pub(crate) fn status_error(url: String, status: StatusCode, body: String) -> CoreError {
    TransportError::Status {
        url,
        status: status.as_u16(),
        body,
    }
    .into()
}

/// Validate an HTTP(S) base URL and strip any trailing slash.
pub(crate) fn parse_connection(connection: &str) -> Result<String, CoreError> {
    let parsed = Url::parse(connection).map_err(|e| {
        CoreError::Config(format!(
            "invalid connection `{connection}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(connection.trim_end_matches('/').to_owned()),
        other => Err(CoreError::Config(format!(
            "unsupported connection scheme `{other}`; expected http or https"
        ))),
    }
}
