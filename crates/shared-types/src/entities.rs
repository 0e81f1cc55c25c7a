//! # Core Primitives
//!
//! Value types shared by the VPN subsystem, the query facade and the API
//! gateway.
//!
//! ## Clusters
//!
//! - **Accounts**: `AccAddress`
//! - **Money**: `Coin`, `Coins`
//! - **Bandwidth**: `Bandwidth`

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::errors::AddressError;

/// Ledger height (block number).
pub type Height = u64;

// =============================================================================
// CLUSTER A: ACCOUNTS
// =============================================================================

/// Length in bytes of a well-formed account address.
pub const ADDRESS_LEN: usize = 20;

/// Account identity of a message signer or entity owner.
///
/// Stored as raw bytes and rendered as lowercase hex. An empty address is
/// representable on purpose: it is what an unsigned message carries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccAddress(Vec<u8>);

impl AccAddress {
    /// Wrap raw address bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The empty address.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Parse a hex-encoded address. The empty string yields the empty address.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| AddressError::InvalidEncoding(e.to_string()))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True when no bytes are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the address has exactly [`ADDRESS_LEN`] bytes.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == ADDRESS_LEN
    }
}

impl fmt::Display for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl TryFrom<String> for AccAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<AccAddress> for String {
    fn from(address: AccAddress) -> Self {
        address.to_string()
    }
}

impl From<[u8; ADDRESS_LEN]> for AccAddress {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes.to_vec())
    }
}

// =============================================================================
// CLUSTER B: MONEY
// =============================================================================

/// Maximum denomination length.
pub const MAX_DENOM_LEN: usize = 128;

/// Minimum denomination length.
pub const MIN_DENOM_LEN: usize = 3;

/// Check a denomination: a lowercase letter followed by lowercase letters,
/// digits or `/`, between [`MIN_DENOM_LEN`] and [`MAX_DENOM_LEN`] bytes.
pub fn is_valid_denom(denom: &str) -> bool {
    let bytes = denom.as_bytes();
    if bytes.len() < MIN_DENOM_LEN || bytes.len() > MAX_DENOM_LEN {
        return false;
    }
    bytes[0].is_ascii_lowercase()
        && bytes[1..]
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'/')
}

/// A single `(denomination, amount)` pair.
///
/// The amount is signed so that zero and negative values survive decoding and
/// can be rejected by validation with a field-level error.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination, e.g. `"udvpn"`.
    pub denom: String,
    /// Amount in the smallest unit of the denomination.
    #[serde_as(as = "DisplayFromStr")]
    pub amount: i128,
}

impl Coin {
    /// Create a coin.
    pub fn new(denom: impl Into<String>, amount: i128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Valid denomination and strictly positive amount.
    pub fn is_valid_positive(&self) -> bool {
        is_valid_denom(&self.denom) && self.amount > 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Ordered set of coins, one entry per denomination.
///
/// Construction does not sort or deduplicate: a caller-supplied set is kept
/// exactly as received so [`Coins::is_valid`] can judge it. Use
/// [`Coins::normalized`] to build a valid set from loose input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    /// Wrap coins as given.
    pub fn new(coins: Vec<Coin>) -> Self {
        Self(coins)
    }

    /// Sort by denomination and merge duplicates by summing their amounts.
    pub fn normalized(mut coins: Vec<Coin>) -> Self {
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        let mut merged: Vec<Coin> = Vec::with_capacity(coins.len());
        for coin in coins {
            match merged.last_mut() {
                Some(last) if last.denom == coin.denom => {
                    last.amount = last.amount.saturating_add(coin.amount)
                }
                _ => merged.push(coin),
            }
        }
        Self(merged)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in stored order.
    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    /// Every amount is strictly positive. Vacuously true when empty.
    pub fn is_all_positive(&self) -> bool {
        self.0.iter().all(|c| c.amount > 0)
    }

    /// Non-empty, denominations valid and strictly ascending, amounts positive.
    pub fn is_valid(&self) -> bool {
        if self.0.is_empty() {
            return false;
        }
        if !self.0.iter().all(Coin::is_valid_positive) {
            return false;
        }
        self.0.windows(2).all(|w| w[0].denom < w[1].denom)
    }

    /// Entry for a denomination, if present.
    pub fn find(&self, denom: &str) -> Option<&Coin> {
        self.0.iter().find(|c| c.denom == denom)
    }

    /// Amount held for a denomination, zero when absent.
    pub fn amount_of(&self, denom: &str) -> i128 {
        self.find(denom).map(|c| c.amount).unwrap_or(0)
    }
}

impl From<Vec<Coin>> for Coins {
    fn from(coins: Vec<Coin>) -> Self {
        Self(coins)
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// CLUSTER C: BANDWIDTH
// =============================================================================

/// Bytes per gigabyte used for per-GB pricing.
pub const GIGABYTE: i128 = 1_000_000_000;

/// An `(upload, download)` pair.
///
/// Used both for advertised internet speed (bits per second) and for
/// consumed traffic (bytes). Signed so that negative claims can be rejected.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bandwidth {
    /// Upload component.
    #[serde_as(as = "DisplayFromStr")]
    pub upload: i128,
    /// Download component.
    #[serde_as(as = "DisplayFromStr")]
    pub download: i128,
}

impl Bandwidth {
    /// Create a bandwidth pair.
    pub const fn new(upload: i128, download: i128) -> Self {
        Self { upload, download }
    }

    /// The `(0, 0)` pair.
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Both components strictly positive.
    pub fn is_all_positive(&self) -> bool {
        self.upload > 0 && self.download > 0
    }

    /// Both components zero.
    pub fn is_all_zero(&self) -> bool {
        self.upload == 0 && self.download == 0
    }

    /// Either component strictly negative.
    pub fn is_any_negative(&self) -> bool {
        self.upload < 0 || self.download < 0
    }

    /// Both components zero or positive.
    pub fn is_all_non_negative(&self) -> bool {
        !self.is_any_negative()
    }

    /// Each component of `self` is at least the matching one of `other`.
    pub fn is_all_gte(&self, other: &Bandwidth) -> bool {
        self.upload >= other.upload && self.download >= other.download
    }

    /// Upload plus download.
    pub fn sum(&self) -> i128 {
        self.upload.saturating_add(self.download)
    }

    /// Component-wise saturating addition.
    pub fn add(&self, other: &Bandwidth) -> Bandwidth {
        Bandwidth::new(
            self.upload.saturating_add(other.upload),
            self.download.saturating_add(other.download),
        )
    }

    /// Component-wise subtraction, `None` if either component would go
    /// negative.
    pub fn checked_sub(&self, other: &Bandwidth) -> Option<Bandwidth> {
        if !self.is_all_gte(other) {
            return None;
        }
        Some(Bandwidth::new(
            self.upload - other.upload,
            self.download - other.download,
        ))
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}up/{}down", self.upload, self.download)
    }
}
