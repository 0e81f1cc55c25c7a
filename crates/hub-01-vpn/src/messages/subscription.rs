//! Subscription lifecycle messages.

use serde::{Deserialize, Serialize};
use shared_types::{AccAddress, Coin, Id};

use super::{validate_from, Message};
use crate::domain::ValidationError;

/// Buy bandwidth from a node by locking a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSubscription {
    pub from: AccAddress,
    pub node_id: Id,
    pub deposit: Coin,
}

impl StartSubscription {
    pub fn new(from: AccAddress, node_id: Id, deposit: Coin) -> Self {
        Self {
            from,
            node_id,
            deposit,
        }
    }
}

impl Message for StartSubscription {
    const TYPE_NAME: &'static str = "vpn/StartSubscription";

    fn action(&self) -> &'static str {
        "start_subscription"
    }

    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_from(&self.from)?;
        if !self.deposit.is_valid_positive() {
            return Err(ValidationError::InvalidField("deposit"));
        }
        Ok(())
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from.clone()]
    }
}

/// End a subscription, immediately or once its active session closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSubscription {
    pub from: AccAddress,
    pub id: Id,
}

impl EndSubscription {
    pub fn new(from: AccAddress, id: Id) -> Self {
        Self { from, id }
    }
}

impl Message for EndSubscription {
    const TYPE_NAME: &'static str = "vpn/EndSubscription";

    fn action(&self) -> &'static str {
        "end_subscription"
    }

    fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_from(&self.from)
    }

    fn signers(&self) -> Vec<AccAddress> {
        vec![self.from.clone()]
    }
}
