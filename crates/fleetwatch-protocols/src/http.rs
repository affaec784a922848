//! Generic HTTP sender contract.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HttpError;
use crate::types::JsonObject;

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

/// An outbound JSON request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    /// Full `Authorization` header value, if any.
    pub auth_header: Option<String>,
    pub method: HttpMethod,
    pub body: Option<serde_json::Value>,
    /// Whether the caller needs the response body parsed.
    pub want_body: bool,
}

impl HttpRequest {
    /// A request without auth or body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_header: None,
            method,
            body: None,
            want_body: false,
        }
    }

    /// JSON POST, the shape used for webhooks.
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(HttpMethod::Post, url).with_body(body)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_auth(mut self, header: impl Into<String>) -> Self {
        self.auth_header = Some(header.into());
        self
    }

    pub fn expecting_body(mut self) -> Self {
        self.want_body = true;
        self
    }
}

/// Response status and parsed body. Non-object bodies parse to an empty map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpReply {
    pub status: u16,
    pub body: JsonObject,
}

impl HttpReply {
    /// 2xx or 3xx.
    pub fn is_delivered(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// Sends JSON requests; shared by the chain executor and webhook delivery.
#[async_trait]
pub trait HttpSender: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, HttpError>;
}
