//! Session lifecycle and metering messages.

use serde::{Deserialize, Serialize};
use shared_types::{AccAddress, Bandwidth, Id};

use super::{validate_from, Message};
use crate::domain::ValidationError;

/// Open a metering session under a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSession {
    pub from: AccAddress,
    pub subscription_id: Id,
}

impl StartSession {
    pub fn new(from: AccAddress, subscription_id: Id) -> Self {
        Self {
            from,
            subscription_id,
        }
    }
}

impl Message for StartSession {
    const TYPE_NAME: &'static str = "vpn/StartSession";

    fn action(&self) -> &'static str {
        "start_session"
    }

    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_from(&self.from)
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from.clone()]
    }
}

/// Report cumulative traffic for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSessionBandwidth {
    pub from: AccAddress,
    pub id: Id,
    pub consumed: Bandwidth,
}

impl UpdateSessionBandwidth {
    pub fn new(from: AccAddress, id: Id, consumed: Bandwidth) -> Self {
        Self { from, id, consumed }
    }
}

impl Message for UpdateSessionBandwidth {
    const TYPE_NAME: &'static str = "vpn/UpdateSessionBandwidth";

    fn action(&self) -> &'static str {
        "update_session_bandwidth"
    }

    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_from(&self.from)?;
        if self.consumed.is_any_negative() {
            return Err(ValidationError::InvalidField("consumed"));
        }
        Ok(())
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from.clone()]
    }
}

/// Close a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSession {
    pub from: AccAddress,
    pub id: Id,
}

impl EndSession {
    pub fn new(from: AccAddress, id: Id) -> Self {
        Self { from, id }
    }
}

impl Message for EndSession {
    const TYPE_NAME: &'static str = "vpn/EndSession";

    fn action(&self) -> &'static str {
        "end_session"
    }

    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_from(&self.from)
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from.clone()]
    }
}
