//! # Domain Invariants
//!
//! Business rules for the VPN registry that need more than one entity or a
//! before/after pair to check. Single-entity status rules live on the
//! entities themselves.

use shared_types::{AccAddress, Bandwidth, Coin, Id, GIGABYTE};

use super::entities::{Node, Session, Subscription};
use super::errors::KeeperError;

/// Maximum node moniker length, in characters.
pub const MAX_MONIKER_LEN: usize = 128;

/// Bytes a deposit pays for at a per-gigabyte price.
///
/// Zero when the price is not positive or the denominations differ.
/// Saturates instead of overflowing.
pub fn quota_bytes(deposit: &Coin, price_per_gb: &Coin) -> i128 {
    if price_per_gb.amount <= 0 || deposit.denom != price_per_gb.denom {
        return 0;
    }
    deposit.amount.saturating_mul(GIGABYTE) / price_per_gb.amount
}

/// Invariant: only `expected` may sign.
pub fn invariant_signed_by(signer: &AccAddress, expected: &AccAddress) -> Result<(), KeeperError> {
    if signer != expected {
        return Err(KeeperError::Unauthorized {
            signer: signer.clone(),
            expected: expected.clone(),
        });
    }
    Ok(())
}

/// Invariant: a subscription's price must be one the node quotes.
pub fn invariant_price_offered<'a>(node: &'a Node, denom: &str) -> Result<&'a Coin, KeeperError> {
    node.price_for(denom)
        .ok_or_else(|| KeeperError::PriceNotFound {
            node_id: node.id,
            denom: denom.to_string(),
        })
}

/// Invariant: at most one active session per subscription.
///
/// `sessions` are the existing children of `subscription_id`.
pub fn invariant_single_active_session(
    subscription_id: Id,
    sessions: &[Session],
) -> Result<(), KeeperError> {
    match sessions.iter().find(|s| s.is_active()) {
        Some(active) => Err(KeeperError::SessionAlreadyActive {
            subscription_id,
            session_id: active.id,
        }),
        None => Ok(()),
    }
}

/// Invariant: reported consumption never decreases in either dimension.
///
/// Returns the delta to add to the parent subscription.
pub fn invariant_monotonic_consumption(
    session: &Session,
    reported: &Bandwidth,
) -> Result<Bandwidth, KeeperError> {
    reported
        .checked_sub(&session.consumed)
        .ok_or(KeeperError::BandwidthDecreased(session.id))
}

/// Invariant: total metered bytes stay within the deposit's quota.
pub fn invariant_within_quota(
    subscription: &Subscription,
    consumed: &Bandwidth,
) -> Result<(), KeeperError> {
    let quota = subscription.quota_bytes();
    let requested = consumed.sum();
    if requested > quota {
        return Err(KeeperError::QuotaExceeded {
            subscription_id: subscription.id,
            quota,
            requested,
        });
    }
    Ok(())
}
