//! Values carried from one step's response into the next step's request.

use std::collections::BTreeMap;

use serde_json::Value;

use fleetwatch_protocols::{JsonObject, RequestSection, RouteStep, StepStatus};

/// Propagated values for the next step of a chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Carry {
    pub body: JsonObject,
    pub query: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    /// Test token found in the previous response.
    pub auth: Option<String>,
}

impl Carry {
    /// Extract the values `step` propagates from its actual `response`.
    ///
    /// Query and params values must be strings; anything else fails the step
    /// with [`StepStatus::FailedWrongType`]. Any string value containing
    /// `token_marker` becomes the next auth header.
    pub fn extract(
        step: &RouteStep,
        response: &JsonObject,
        token_marker: &str,
    ) -> Result<Self, StepStatus> {
        let mut carry = Carry::default();

        for (key, value) in response {
            if step.next_route_body.contains(key) {
                carry.body.insert(key.clone(), value.clone());
            }
            if step.next_route_query.contains(key) {
                let text = expect_string(value, RequestSection::Query)?;
                carry.query.insert(key.clone(), text);
            }
            if step.next_route_params.contains(key) {
                let text = expect_string(value, RequestSection::Params)?;
                carry.params.insert(key.clone(), text);
            }
            if let Value::String(text) = value {
                if !token_marker.is_empty() && text.contains(token_marker) {
                    carry.auth = Some(text.clone());
                }
            }
        }

        Ok(carry)
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.query.is_empty() && self.params.is_empty() && self.auth.is_none()
    }
}

fn expect_string(value: &Value, section: RequestSection) -> Result<String, StepStatus> {
    match value {
        Value::String(text) => Ok(text.clone()),
        _ => Err(StepStatus::FailedWrongType(section)),
    }
}
