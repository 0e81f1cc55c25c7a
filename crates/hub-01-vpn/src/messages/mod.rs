//! # Messages
//!
//! Every state-changing request to the VPN subsystem is a message. Each
//! message checks itself statelessly with [`Message::validate_basic`] before
//! the keeper loads any state. Validation reports the first failing field,
//! in a fixed per-message order.
//!
//! ## Signing payload
//!
//! `sign_bytes` is the compact JSON of `{"type": <TYPE_NAME>, "value": <msg>}`
//! with object keys sorted at every level. Two encodings of the same message
//! produce identical bytes, and messages of different kinds never collide
//! even when their fields match.

mod node;
mod session;
mod subscription;

pub use node::{DeregisterNode, RegisterNode, SetNodeStatus, UpdateNodeInfo};
pub use session::{EndSession, StartSession, UpdateSessionBandwidth};
pub use subscription::{EndSubscription, StartSubscription};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared_types::AccAddress;

use crate::domain::{ValidationError, MAX_MONIKER_LEN};

/// Route every VPN message is dispatched under.
pub const ROUTER_KEY: &str = "vpn";

/// Capability shared by all VPN messages.
pub trait Message: Serialize {
    /// Tag used in the `Msg` envelope and the signing payload.
    const TYPE_NAME: &'static str;

    /// Dispatch route.
    fn route(&self) -> &'static str {
        ROUTER_KEY
    }

    /// Action name, e.g. `"register_node"`.
    fn action(&self) -> &'static str;

    /// Stateless checks, first failure wins.
    fn validate_basic(&self) -> Result<(), ValidationError>;

    /// Canonical signing payload.
    fn sign_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        canonical_sign_bytes(Self::TYPE_NAME, self)
    }

    /// Accounts that must sign. Always exactly the sender.
    fn signers(&self) -> Vec<AccAddress>;
}

/// Any VPN message, tagged with its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Msg {
    #[serde(rename = "vpn/RegisterNode")]
    RegisterNode(RegisterNode),
    #[serde(rename = "vpn/UpdateNodeInfo")]
    UpdateNodeInfo(UpdateNodeInfo),
    #[serde(rename = "vpn/DeregisterNode")]
    DeregisterNode(DeregisterNode),
    #[serde(rename = "vpn/SetNodeStatus")]
    SetNodeStatus(SetNodeStatus),
    #[serde(rename = "vpn/StartSubscription")]
    StartSubscription(StartSubscription),
    #[serde(rename = "vpn/EndSubscription")]
    EndSubscription(EndSubscription),
    #[serde(rename = "vpn/StartSession")]
    StartSession(StartSession),
    #[serde(rename = "vpn/UpdateSessionBandwidth")]
    UpdateSessionBandwidth(UpdateSessionBandwidth),
    #[serde(rename = "vpn/EndSession")]
    EndSession(EndSession),
}

macro_rules! delegate {
    ($self:ident, $m:ident => $body:expr) => {
        match $self {
            Msg::RegisterNode($m) => $body,
            Msg::UpdateNodeInfo($m) => $body,
            Msg::DeregisterNode($m) => $body,
            Msg::SetNodeStatus($m) => $body,
            Msg::StartSubscription($m) => $body,
            Msg::EndSubscription($m) => $body,
            Msg::StartSession($m) => $body,
            Msg::UpdateSessionBandwidth($m) => $body,
            Msg::EndSession($m) => $body,
        }
    };
}

fn type_name_of<M: Message>(_: &M) -> &'static str {
    M::TYPE_NAME
}

impl Msg {
    /// Envelope tag of the wrapped message.
    pub fn type_name(&self) -> &'static str {
        delegate!(self, m => type_name_of(m))
    }

    /// Dispatch route.
    pub fn route(&self) -> &'static str {
        delegate!(self, m => m.route())
    }

    /// Action name of the wrapped message.
    pub fn action(&self) -> &'static str {
        delegate!(self, m => m.action())
    }

    /// Stateless validation of the wrapped message.
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        delegate!(self, m => m.validate_basic())
    }

    /// Canonical signing payload of the wrapped message.
    pub fn sign_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        delegate!(self, m => m.sign_bytes())
    }

    /// Required signers of the wrapped message.
    pub fn signers(&self) -> Vec<AccAddress> {
        delegate!(self, m => m.signers())
    }

    /// Sender of the wrapped message.
    pub fn sender(&self) -> &AccAddress {
        delegate!(self, m => &m.from)
    }
}

macro_rules! impl_from_for_msg {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Msg {
                fn from(msg: $variant) -> Self {
                    Msg::$variant(msg)
                }
            }
        )*
    };
}

impl_from_for_msg!(
    RegisterNode,
    UpdateNodeInfo,
    DeregisterNode,
    SetNodeStatus,
    StartSubscription,
    EndSubscription,
    StartSession,
    UpdateSessionBandwidth,
    EndSession
);

/// Sender must be present and well formed.
pub(crate) fn validate_from(from: &AccAddress) -> Result<(), ValidationError> {
    if from.is_empty() || !from.is_well_formed() {
        return Err(ValidationError::InvalidField("from"));
    }
    Ok(())
}

/// Moniker must not exceed [`MAX_MONIKER_LEN`] characters.
pub(crate) fn validate_moniker(moniker: &str) -> Result<(), ValidationError> {
    if moniker.chars().count() > MAX_MONIKER_LEN {
        return Err(ValidationError::InvalidField("moniker"));
    }
    Ok(())
}

/// Compact JSON of `value` with object keys sorted at every depth.
///
/// Fails only when `value` itself cannot be represented as JSON, e.g. a map
/// with non-string keys.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let sorted = sort_keys(serde_json::to_value(value)?);
    serde_json::to_vec(&sorted)
}

fn canonical_sign_bytes<M: Serialize + ?Sized>(
    type_name: &str,
    msg: &M,
) -> Result<Vec<u8>, serde_json::Error> {
    #[derive(Serialize)]
    struct Envelope<'a, M: ?Sized> {
        #[serde(rename = "type")]
        type_name: &'a str,
        value: &'a M,
    }
    canonical_json(&Envelope {
        type_name,
        value: msg,
    })
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, child) in entries {
                sorted.insert(key, sort_keys(child));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
