//! # Fleetwatch HTTP - reqwest
//!
//! [`HttpSender`] implementation used for chain steps and webhook delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use tracing::debug;

use fleetwatch_protocols::{HttpError, HttpMethod, HttpReply, HttpRequest, HttpSender, JsonObject};

#[cfg(test)]
#[path = "sender_tests.rs"]
mod tests;

/// JSON sender backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestSender {
    client: Client,
}

impl ReqwestSender {
    /// Create a sender whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Parse a response body. Empty, non-JSON and non-object bodies yield an
/// empty map.
pub fn parse_body(bytes: &[u8]) -> JsonObject {
    if bytes.is_empty() {
        return JsonObject::new();
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => JsonObject::new(),
        Err(e) => {
            debug!(error = %e, "Response body is not JSON");
            JsonObject::new()
        }
    }
}

#[async_trait]
impl HttpSender for ReqwestSender {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, HttpError> {
        let url = Url::parse(&request.url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        let mut builder = self.client.request(to_method(request.method), url);
        if let Some(auth) = &request.auth_header {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        debug!(method = %request.method, url = %request.url, status, "HTTP request sent");

        let body = if request.want_body {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| HttpError::Decode(e.to_string()))?;
            parse_body(&bytes)
        } else {
            JsonObject::new()
        };

        Ok(HttpReply { status, body })
    }
}
