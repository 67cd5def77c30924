//! Thin request helper shared by every API call.
//!
//! One call, one response: no retries, no caching, no timeout override.

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Error, RequestFailure, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { url: url.into(), method, query: Vec::new(), body: None, headers: Vec::new() }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

/// Send `req` and return the raw body of a 2xx response.
pub async fn request(http: &Client, req: HttpRequest) -> Result<String> {
    debug!(method = req.method.as_str(), url = %req.url, "sending request");

    let mut builder = http.request(req.method.into(), &req.url).query(&req.query);
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &req.body {
        builder = builder.json(body);
    }

    let res = builder.send().await.map_err(|e| {
        warn!(url = %req.url, error = %e, "request could not be sent");
        Error::request(&req.url, e)
    })?;

    let status = res.status();
    let body = res.text().await.map_err(|e| Error::request(&req.url, e))?;

    if !status.is_success() {
        warn!(url = %req.url, %status, "request returned non-success status");
        return Err(Error::request(
            &req.url,
            RequestFailure::Status { status, body: truncate_body(&body) },
        ));
    }

    Ok(body)
}

/// Like [`request`], decoding the body as JSON.
pub async fn request_json<T: DeserializeOwned>(http: &Client, req: HttpRequest) -> Result<T> {
    let url = req.url.clone();
    let body = request(http, req).await?;
    serde_json::from_str(&body).map_err(|e| {
        warn!(%url, error = %e, "response body did not match the expected schema");
        Error::request(&url, e)
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
