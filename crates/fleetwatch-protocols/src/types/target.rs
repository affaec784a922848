//! Monitored target descriptors.

use serde::{Deserialize, Serialize};

/// One monitored application.
///
/// Container-backed targets are inspected through the control plane using
/// their container id or name; network targets are dialed at `address:port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    #[serde(default)]
    pub containerized: bool,
    /// Runtime container id or name. Empty means the target id.
    #[serde(default)]
    pub container_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub port: u16,
    /// Last known status label, as recorded before the current probe.
    #[serde(default)]
    pub status: String,
}

impl TargetDescriptor {
    /// Create a network-backed target.
    pub fn network(
        id: i64,
        name: impl Into<String>,
        owner_id: i64,
        address: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            owner_id,
            containerized: false,
            container_id: String::new(),
            address: address.into(),
            port,
            status: String::new(),
        }
    }

    /// Create a container-backed target.
    pub fn container(id: i64, name: impl Into<String>, owner_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            owner_id,
            containerized: true,
            container_id: String::new(),
            address: String::new(),
            port: 0,
            status: String::new(),
        }
    }

    /// Set the last known status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the runtime container id or name.
    pub fn with_container_id(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = container_id.into();
        self
    }

    /// Identifier used when asking the control plane about this target.
    pub fn container_ref(&self) -> String {
        if self.container_id.is_empty() {
            self.id.to_string()
        } else {
            self.container_id.clone()
        }
    }

    /// `address:port` for a TCP dial.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let target = TargetDescriptor::network(1, "api", 9, "10.0.0.5", 9999);
        assert_eq!(target.socket_addr(), "10.0.0.5:9999");
        assert!(!target.containerized);
    }

    #[test]
    fn test_container_target() {
        let target = TargetDescriptor::container(42, "worker", 9).with_status("running");
        assert!(target.containerized);
        assert_eq!(target.container_ref(), "42");
        assert_eq!(target.status, "running");
    }

    #[test]
    fn test_container_id_takes_precedence() {
        let target = TargetDescriptor::container(42, "worker", 9).with_container_id("web-1");
        assert_eq!(target.container_ref(), "web-1");

        let parsed: TargetDescriptor =
            serde_json::from_str(r#"{"id": 3, "name": "db", "owner_id": 1, "containerized": true}"#)
                .unwrap();
        assert_eq!(parsed.container_ref(), "3");
    }
}
