//! Control-plane errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("Control plane unreachable: {0}")]
    Unreachable(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Control plane request failed: {0}")]
    Request(String),

    #[error("Invalid control plane response: {0}")]
    InvalidResponse(String),
}
