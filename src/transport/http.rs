use super::{Transport, TransportError};
use crate::types::{Method, Request, RequestBody, Response};
use crate::Result;
use async_trait::async_trait;
use reqwest::Proxy;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tracing::warn;

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Per-request timeout; elapsing it yields a `Timeout` transport failure.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub proxy_url: Option<String>,
    /// Headers applied to every request before the request's own headers.
    pub default_headers: HashMap<String, String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            proxy_url: None,
            default_headers: HashMap::new(),
        }
    }
}

impl HttpTransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by environment variables:
    /// - `FAST_REQUESTS_HTTP_TIMEOUT_SECS` (default 30)
    /// - `FAST_REQUESTS_CONNECT_TIMEOUT_SECS` (default 10)
    /// - `FAST_REQUESTS_POOL_MAX_IDLE_PER_HOST` (default 32)
    /// - `FAST_REQUESTS_POOL_IDLE_TIMEOUT_SECS` (default 90)
    /// - `FAST_REQUESTS_PROXY_URL`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout: env_parse::<u64>("FAST_REQUESTS_HTTP_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: env_parse::<u64>("FAST_REQUESTS_CONNECT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            pool_max_idle_per_host: env_parse("FAST_REQUESTS_POOL_MAX_IDLE_PER_HOST")
                .unwrap_or(defaults.pool_max_idle_per_host),
            pool_idle_timeout: env_parse::<u64>("FAST_REQUESTS_POOL_IDLE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.pool_idle_timeout),
            proxy_url: env::var("FAST_REQUESTS_PROXY_URL").ok().filter(|s| !s.is_empty()),
            default_headers: defaults.default_headers,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}

fn client_build_error(e: reqwest::Error) -> crate::Error {
    crate::Error::Transport(TransportError::from(e))
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
///
/// Cheap to share: the dispatcher holds it behind an `Arc` and every in-flight
/// request reuses the same connection pool.
pub struct HttpTransport {
    client: reqwest::Client,
    default_headers: HashMap<String, String>,
}

impl HttpTransport {
    /// Build with [`HttpTransportConfig::from_env`].
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::from_env())
    }

    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout));

        if let Some(proxy_url) = &config.proxy_url {
            match Proxy::all(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => warn!(proxy_url = proxy_url.as_str(), error = %e, "ignoring invalid proxy URL"),
            }
        }

        let client = builder.build().map_err(client_build_error)?;

        Ok(Self {
            client,
            default_headers: config.default_headers,
        })
    }

    fn build_request(&self, request: &Request) -> reqwest::RequestBuilder {
        let mut req = match request.method {
            Method::Get => self.client.get(request.url.clone()),
            Method::Post => self.client.post(request.url.clone()),
        };

        // Request headers replace defaults of the same name (case-insensitive).
        let overridden = |name: &str| {
            request
                .headers
                .as_ref()
                .is_some_and(|h| h.keys().any(|k| k.eq_ignore_ascii_case(name)))
        };
        for (k, v) in &self.default_headers {
            if !overridden(k) {
                req = req.header(k.as_str(), v.as_str());
            }
        }
        if let Some(headers) = &request.headers {
            for (k, v) in headers {
                req = req.header(k.as_str(), v.as_str());
            }
        }

        if let Some(params) = &request.params {
            req = req.query(params);
        }

        // Request::validate keeps bodies off GET.
        if let (Method::Post, Some(body)) = (request.method, &request.body) {
            req = match body {
                RequestBody::Bytes(b) => req.body(b.clone()),
                RequestBody::Json(v) => req.json(v),
                RequestBody::Form(f) => req.form(f),
            };
        }

        req
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &Request) -> std::result::Result<Response, TransportError> {
        let resp = self.build_request(request).send().await?;
        let status_code = resp.status().as_u16();
        let body = resp.bytes().await?;
        Ok(Response { status_code, body })
    }
}
