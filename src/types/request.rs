//! Request records submitted to the dispatcher.

use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// Caller-chosen identifier used to key results.
///
/// It is opaque to the dispatcher and need not be derived from the URL, so the
/// same URL may be requested several times under distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<usize> for RequestId {
    fn from(n: usize) -> Self {
        Self(n.to_string())
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload (bytes or mapping).
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent verbatim.
    Bytes(Bytes),
    /// Serialized as `application/json`.
    Json(serde_json::Value),
    /// Sent form-encoded (`application/x-www-form-urlencoded`).
    Form(HashMap<String, String>),
}

impl RequestBody {
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        RequestBody::Bytes(data.into())
    }

    pub fn json(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }

    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        RequestBody::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A single outbound request.
///
/// Built once and never mutated after submission; the dispatcher shares it
/// read-only with every attempt of its chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub url: Url,
    pub method: Method,
    pub headers: Option<HashMap<String, String>>,
    pub params: Option<HashMap<String, String>>,
    pub body: Option<RequestBody>,
}

impl Request {
    /// Create a request, parsing `url` eagerly.
    pub fn new(id: impl Into<RequestId>, method: Method, url: impl AsRef<str>) -> Result<Self> {
        let id = id.into();
        let raw = url.as_ref();
        let url = Url::parse(raw).map_err(|e| {
            Error::validation_with_context(
                format!("invalid URL '{}': {}", raw, e),
                ErrorContext::new()
                    .with_field_path(format!("request[{}].url", id))
                    .with_source("request_builder"),
            )
        })?;
        check_scheme(&id, &url)?;
        Ok(Self {
            id,
            url,
            method,
            headers: None,
            params: None,
            body: None,
        })
    }

    pub fn get(id: impl Into<RequestId>, url: impl AsRef<str>) -> Result<Self> {
        Self::new(id, Method::Get, url)
    }

    pub fn post(id: impl Into<RequestId>, url: impl AsRef<str>) -> Result<Self> {
        Self::new(id, Method::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Check the shape constraints that cannot be enforced by the builder alone.
    ///
    /// GET carries query parameters only; the URL must be http(s) and every
    /// header must be a legal HTTP header name and value.
    pub fn validate(&self) -> Result<()> {
        check_scheme(&self.id, &self.url)?;
        if let Some(headers) = &self.headers {
            for (name, value) in headers {
                let problem = if HeaderName::from_bytes(name.as_bytes()).is_err() {
                    Some("invalid header name")
                } else if HeaderValue::from_str(value).is_err() {
                    Some("invalid header value")
                } else {
                    None
                };
                if let Some(problem) = problem {
                    return Err(Error::validation_with_context(
                        format!("{} '{}'", problem, name),
                        ErrorContext::new()
                            .with_field_path(format!("request[{}].headers.{}", self.id, name))
                            .with_source("request_validator"),
                    ));
                }
            }
        }
        if self.method == Method::Get && self.body.is_some() {
            return Err(Error::validation_with_context(
                "GET requests cannot carry a body",
                ErrorContext::new()
                    .with_field_path(format!("request[{}].body", self.id))
                    .with_source("request_validator"),
            ));
        }
        Ok(())
    }
}

fn check_scheme(id: &RequestId, url: &Url) -> Result<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::validation_with_context(
            format!("unsupported URL scheme '{}'", other),
            ErrorContext::new()
                .with_field_path(format!("request[{}].url", id))
                .with_details("expected http or https")
                .with_source("request_validator"),
        )),
    }
}
