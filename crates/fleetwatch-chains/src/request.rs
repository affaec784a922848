//! Building a step's HTTP request.

use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use fleetwatch_protocols::{Endpoint, HttpRequest, JsonObject, RouteStep};

use crate::propagate::Carry;

const BEARER_PREFIX: &str = "Bearer ";

/// Request template of a step after propagated values were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStep {
    /// Substituted path, for display. Requests are built from `segments`.
    pub path: String,
    /// Raw path segments after substitution.
    pub segments: Vec<String>,
    pub query: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub body: JsonObject,
    pub auth_header: String,
}

/// Apply `carry` over the step's template. A propagated value replaces the
/// template value only when it is non-empty.
pub fn merge(step: &RouteStep, carry: &Carry) -> ResolvedStep {
    let mut body = step.body.clone();
    for (key, value) in &carry.body {
        if !is_blank(value) {
            body.insert(key.clone(), value.clone());
        }
    }

    let mut query = step.query.clone();
    overlay_strings(&mut query, &carry.query);

    let mut params = step.params.clone();
    overlay_strings(&mut params, &carry.params);

    let auth_header = match carry.auth.as_deref() {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => step.auth_header.clone(),
    };

    let segments = path_segments(&step.path, &params);
    let path = format!("/{}", segments.join("/"));

    ResolvedStep {
        path,
        segments,
        query,
        params,
        body,
        auth_header,
    }
}

fn overlay_strings(target: &mut BTreeMap<String, String>, carried: &BTreeMap<String, String>) {
    for (key, value) in carried {
        if !value.is_empty() {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Split `path` into segments and replace every `{name}` with its param
/// value. Values stay raw; they are percent-encoded when the URL is built.
pub fn path_segments(path: &str, params: &BTreeMap<String, String>) -> Vec<String> {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| {
            params.iter().fold(segment.to_string(), |acc, (name, value)| {
                acc.replace(&format!("{{{}}}", name), value)
            })
        })
        .collect()
}

/// `Bearer {token}` unless the value already carries the scheme.
pub fn bearer(token: &str) -> String {
    if token.starts_with(BEARER_PREFIX) {
        token.to_string()
    } else {
        format!("{}{}", BEARER_PREFIX, token)
    }
}

/// Full request for one step against `endpoint`.
pub fn build_request(
    endpoint: &Endpoint,
    step: &RouteStep,
    carry: &Carry,
) -> Result<HttpRequest, url::ParseError> {
    let resolved = merge(step, carry);

    let mut url = Url::parse(&endpoint.base_url())?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .clear()
        .extend(&resolved.segments);
    if !resolved.query.is_empty() {
        url.query_pairs_mut().extend_pairs(resolved.query.iter());
    }

    let mut request = HttpRequest::new(step.method, url.as_str()).expecting_body();
    if !resolved.body.is_empty() {
        request = request.with_body(Value::Object(resolved.body));
    }
    if !resolved.auth_header.is_empty() {
        request = request.with_auth(bearer(&resolved.auth_header));
    }
    Ok(request)
}
