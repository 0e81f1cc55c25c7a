//! Node lifecycle messages.

use serde::{Deserialize, Serialize};
use shared_types::{AccAddress, Bandwidth, Coins, Id};

use super::{validate_from, validate_moniker, Message};
use crate::domain::{NodeStatus, ValidationError};

/// Register a new node owned by `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterNode {
    pub from: AccAddress,
    #[serde(rename = "type")]
    pub node_type: String,
    pub version: String,
    pub moniker: String,
    #[serde(default)]
    pub prices_per_gb: Option<Coins>,
    pub internet_speed: Bandwidth,
    pub encryption: String,
}

impl RegisterNode {
    pub fn new(
        from: AccAddress,
        node_type: impl Into<String>,
        version: impl Into<String>,
        moniker: impl Into<String>,
        prices_per_gb: Option<Coins>,
        internet_speed: Bandwidth,
        encryption: impl Into<String>,
    ) -> Self {
        Self {
            from,
            node_type: node_type.into(),
            version: version.into(),
            moniker: moniker.into(),
            prices_per_gb,
            internet_speed,
            encryption: encryption.into(),
        }
    }
}

impl Message for RegisterNode {
    const TYPE_NAME: &'static str = "vpn/RegisterNode";

    fn action(&self) -> &'static str {
        "register_node"
    }

    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_from(&self.from)?;
        if self.node_type.is_empty() {
            return Err(ValidationError::InvalidField("type"));
        }
        if self.version.is_empty() {
            return Err(ValidationError::InvalidField("version"));
        }
        validate_moniker(&self.moniker)?;
        match &self.prices_per_gb {
            Some(prices) if prices.is_valid() => {}
            _ => return Err(ValidationError::InvalidField("prices_per_gb")),
        }
        if !self.internet_speed.is_all_positive() {
            return Err(ValidationError::InvalidField("internet_speed"));
        }
        if self.encryption.is_empty() {
            return Err(ValidationError::InvalidField("encryption"));
        }
        Ok(())
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from.clone()]
    }
}

/// Patch a node's descriptive fields.
///
/// Empty strings, `None` prices and zero speed components leave the stored
/// value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNodeInfo {
    pub from: AccAddress,
    pub id: Id,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub moniker: String,
    #[serde(default)]
    pub prices_per_gb: Option<Coins>,
    #[serde(default)]
    pub internet_speed: Bandwidth,
    #[serde(default)]
    pub encryption: String,
}

impl UpdateNodeInfo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        from: AccAddress,
        id: Id,
        node_type: impl Into<String>,
        version: impl Into<String>,
        moniker: impl Into<String>,
        prices_per_gb: Option<Coins>,
        internet_speed: Bandwidth,
        encryption: impl Into<String>,
    ) -> Self {
        Self {
            from,
            id,
            node_type: node_type.into(),
            version: version.into(),
            moniker: moniker.into(),
            prices_per_gb,
            internet_speed,
            encryption: encryption.into(),
        }
    }
}

impl Message for UpdateNodeInfo {
    const TYPE_NAME: &'static str = "vpn/UpdateNodeInfo";

    fn action(&self) -> &'static str {
        "update_node_info"
    }

    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_from(&self.from)?;
        validate_moniker(&self.moniker)?;
        if let Some(prices) = &self.prices_per_gb {
            if !prices.is_valid() {
                return Err(ValidationError::InvalidField("prices_per_gb"));
            }
        }
        if self.internet_speed.is_any_negative() {
            return Err(ValidationError::InvalidField("internet_speed"));
        }
        Ok(())
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from.clone()]
    }
}

/// Retire a node permanently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeregisterNode {
    pub from: AccAddress,
    pub id: Id,
}

impl DeregisterNode {
    pub fn new(from: AccAddress, id: Id) -> Self {
        Self { from, id }
    }
}

impl Message for DeregisterNode {
    const TYPE_NAME: &'static str = "vpn/DeregisterNode";

    fn action(&self) -> &'static str {
        "deregister_node"
    }

    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_from(&self.from)
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from.clone()]
    }
}

/// Toggle a node between `Registered` and `Inactive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetNodeStatus {
    pub from: AccAddress,
    pub id: Id,
    pub status: NodeStatus,
}

impl SetNodeStatus {
    pub fn new(from: AccAddress, id: Id, status: NodeStatus) -> Self {
        Self { from, id, status }
    }
}

impl Message for SetNodeStatus {
    const TYPE_NAME: &'static str = "vpn/SetNodeStatus";

    fn action(&self) -> &'static str {
        "set_node_status"
    }

    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_from(&self.from)?;
        if self.status == NodeStatus::Deregistered {
            return Err(ValidationError::InvalidField("status"));
        }
        Ok(())
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from.clone()]
    }
}
