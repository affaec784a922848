//! Pre-registration chain validation.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use fleetwatch_protocols::{RequestSection, RouteStep};

use crate::error::{ChainError, ValidationKind};

const SECTIONS: [RequestSection; 3] = [
    RequestSection::Body,
    RequestSection::Query,
    RequestSection::Params,
];

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}/]+)\}").expect("placeholder pattern is valid"))
}

/// Names of the `{name}` placeholders in `path`, in order of appearance.
pub fn path_placeholders(path: &str) -> Vec<&str> {
    placeholder_pattern()
        .captures_iter(path)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Indices of `steps` in chain order, head first.
///
/// The steps must form one linear sequence: exactly one head, every parent
/// present in the chain, no step pointing at itself, no two steps sharing a
/// parent and every step reachable from the head.
pub fn chain_order(steps: &[RouteStep]) -> Result<Vec<usize>, ChainError> {
    if steps.is_empty() {
        return Err(ChainError::validation(ValidationKind::Structure, "chain has no steps"));
    }

    let mut by_id: HashMap<i64, usize> = HashMap::with_capacity(steps.len());
    for (idx, step) in steps.iter().enumerate() {
        if by_id.insert(step.id, idx).is_some() {
            return Err(ChainError::validation(
                ValidationKind::Structure,
                format!("duplicate step id {}", step.id),
            ));
        }
    }

    let heads: Vec<usize> = (0..steps.len()).filter(|&i| steps[i].is_head()).collect();
    let head = match heads.as_slice() {
        [head] => *head,
        [] => {
            return Err(ChainError::validation(ValidationKind::Structure, "chain has no head step"));
        }
        _ => {
            return Err(ChainError::validation(
                ValidationKind::Structure,
                format!("chain has {} head steps", heads.len()),
            ));
        }
    };

    let mut child_of: HashMap<i64, usize> = HashMap::with_capacity(steps.len());
    for (idx, step) in steps.iter().enumerate() {
        if step.is_head() {
            continue;
        }
        if step.parent_id == step.id {
            return Err(ChainError::validation(
                ValidationKind::Structure,
                format!("step {} is its own parent", step.id),
            ));
        }
        if !by_id.contains_key(&step.parent_id) {
            return Err(ChainError::validation(
                ValidationKind::Structure,
                format!("parent {} of step {} is not in the chain", step.parent_id, step.id),
            ));
        }
        if child_of.insert(step.parent_id, idx).is_some() {
            return Err(ChainError::validation(
                ValidationKind::Structure,
                format!("step {} has more than one child", step.parent_id),
            ));
        }
    }

    let mut order = Vec::with_capacity(steps.len());
    let mut seen = HashSet::with_capacity(steps.len());
    let mut current = Some(head);
    while let Some(idx) = current {
        if !seen.insert(idx) {
            break;
        }
        order.push(idx);
        current = child_of.get(&steps[idx].id).copied();
    }

    if order.len() != steps.len() {
        return Err(ChainError::validation(
            ValidationKind::Structure,
            format!(
                "{} step(s) are not reachable from the head",
                steps.len() - order.len()
            ),
        ));
    }

    Ok(order)
}

/// Validate a chain before it is activated.
///
/// Checks the chain structure, then every adjacent pair's propagation lists
/// against the upstream expected body and the downstream request, then each
/// step's path placeholders against its params.
pub fn validate_chain(steps: &[RouteStep]) -> Result<(), ChainError> {
    let order = chain_order(steps)?;

    for pair in order.windows(2) {
        check_propagation(&steps[pair[0]], &steps[pair[1]])?;
    }

    for step in steps {
        check_path(step)?;
    }

    Ok(())
}

fn check_propagation(upstream: &RouteStep, downstream: &RouteStep) -> Result<(), ChainError> {
    for section in SECTIONS {
        for field in upstream.propagation(section) {
            if !upstream.expected_body.contains_key(field) {
                return Err(ChainError::validation(
                    section.into(),
                    format!(
                        "field '{}' is not in the expected response of step {}",
                        field, upstream.id
                    ),
                ));
            }
            if !downstream.declares_request_field(section, field) {
                return Err(ChainError::validation(
                    section.into(),
                    format!(
                        "field '{}' is not in the request {} of step {}",
                        field, section, downstream.id
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn check_path(step: &RouteStep) -> Result<(), ChainError> {
    let placeholders = path_placeholders(&step.path);
    let names: BTreeSet<&str> = placeholders.iter().copied().collect();
    let params: BTreeSet<&str> = step.params.keys().map(String::as_str).collect();

    if placeholders.len() != step.params.len() || names != params {
        return Err(ChainError::validation(
            ValidationKind::Path,
            format!(
                "path '{}' of step {} has {} placeholder(s) for {} param(s)",
                step.path,
                step.id,
                placeholders.len(),
                step.params.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
