//! Route-chain steps ("working routes").

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::http::HttpMethod;

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;

/// A JSON object (request body, response body, expected body).
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Request section a propagated value flows into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestSection {
    Body,
    Query,
    Params,
}

impl fmt::Display for RequestSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestSection::Body => write!(f, "body"),
            RequestSection::Query => write!(f, "query"),
            RequestSection::Params => write!(f, "params"),
        }
    }
}

/// Outcome of one step. `Unknown` until the executor runs the step; every
/// other state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepStatus {
    #[default]
    Unknown,
    Success,
    FailedDifferentBody,
    FailedStatusCode,
    FailedWrongType(RequestSection),
    FailedRequest,
}

const WRONG_TYPE_PREFIX: &str = "Failed;Wrong type of the property for ";

impl StepStatus {
    /// Whether this outcome stops the rest of the chain.
    pub fn is_failure(&self) -> bool {
        !matches!(self, StepStatus::Unknown | StepStatus::Success)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Unknown => write!(f, "unknown"),
            StepStatus::Success => write!(f, "success"),
            StepStatus::FailedDifferentBody => write!(f, "Failed;Different body"),
            StepStatus::FailedStatusCode => write!(f, "Failed;Status Code"),
            StepStatus::FailedWrongType(section) => write!(f, "{}{}", WRONG_TYPE_PREFIX, section),
            StepStatus::FailedRequest => write!(f, "Failed;Request"),
        }
    }
}

impl FromStr for StepStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" | "" => Ok(StepStatus::Unknown),
            "success" => Ok(StepStatus::Success),
            "Failed;Different body" => Ok(StepStatus::FailedDifferentBody),
            "Failed;Status Code" => Ok(StepStatus::FailedStatusCode),
            "Failed;Request" => Ok(StepStatus::FailedRequest),
            other => match other.strip_prefix(WRONG_TYPE_PREFIX) {
                Some("body") => Ok(StepStatus::FailedWrongType(RequestSection::Body)),
                Some("query") => Ok(StepStatus::FailedWrongType(RequestSection::Query)),
                Some("params") => Ok(StepStatus::FailedWrongType(RequestSection::Params)),
                _ => Err(format!("unknown step status: {}", other)),
            },
        }
    }
}

impl Serialize for StepStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StepStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity of a chain: steps are grouped per application and chain name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainKey {
    pub app_id: i64,
    pub chain_name: String,
}

impl fmt::Display for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_id, self.chain_name)
    }
}

/// One HTTP test step of a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub app_id: i64,
    #[serde(default)]
    pub chain_name: String,

    /// Path template, e.g. `/posts/{postId}`.
    pub path: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Bearer token (without the `Bearer ` prefix).
    #[serde(default)]
    pub auth_header: String,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub body: JsonObject,

    pub expected_status: u16,
    #[serde(default)]
    pub expected_body: JsonObject,

    /// Response fields that flow into the next step's body.
    #[serde(default)]
    pub next_route_body: Vec<String>,
    /// Response fields that flow into the next step's query.
    #[serde(default)]
    pub next_route_query: Vec<String>,
    /// Response fields that flow into the next step's path params.
    #[serde(default)]
    pub next_route_params: Vec<String>,

    /// 0 for the chain head, otherwise the preceding step's id.
    #[serde(default)]
    pub parent_id: i64,
    #[serde(default)]
    pub status: StepStatus,
}

impl RouteStep {
    /// Create a step with an empty request template.
    pub fn new(id: i64, path: impl Into<String>, method: HttpMethod, expected_status: u16) -> Self {
        Self {
            id,
            app_id: 0,
            chain_name: String::new(),
            path: path.into(),
            method,
            auth_header: String::new(),
            query: BTreeMap::new(),
            params: BTreeMap::new(),
            body: JsonObject::new(),
            expected_status,
            expected_body: JsonObject::new(),
            next_route_body: Vec::new(),
            next_route_query: Vec::new(),
            next_route_params: Vec::new(),
            parent_id: 0,
            status: StepStatus::Unknown,
        }
    }

    /// Place the step in a chain.
    pub fn in_chain(mut self, app_id: i64, chain_name: impl Into<String>, parent_id: i64) -> Self {
        self.app_id = app_id;
        self.chain_name = chain_name.into();
        self.parent_id = parent_id;
        self
    }

    pub fn is_head(&self) -> bool {
        self.parent_id == 0
    }

    pub fn chain_key(&self) -> ChainKey {
        ChainKey {
            app_id: self.app_id,
            chain_name: self.chain_name.clone(),
        }
    }

    /// Propagation list for one request section.
    pub fn propagation(&self, section: RequestSection) -> &[String] {
        match section {
            RequestSection::Body => &self.next_route_body,
            RequestSection::Query => &self.next_route_query,
            RequestSection::Params => &self.next_route_params,
        }
    }

    pub fn has_propagation(&self) -> bool {
        !self.next_route_body.is_empty()
            || !self.next_route_query.is_empty()
            || !self.next_route_params.is_empty()
    }

    /// Whether the declared request contains `field` in `section`.
    pub fn declares_request_field(&self, section: RequestSection, field: &str) -> bool {
        match section {
            RequestSection::Body => self.body.contains_key(field),
            RequestSection::Query => self.query.contains_key(field),
            RequestSection::Params => self.params.contains_key(field),
        }
    }
}

/// Live endpoint of an application under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}

/// A step that is due for testing, joined with its application's endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueStep {
    pub endpoint: Endpoint,
    pub step: RouteStep,
}
