use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assumptions::ProjectionInput;
use crate::LeaseProjectionResult;

/// Stable identity of a projection input: FNV-1a over its JSON encoding.
///
/// Every field takes part, including transition-wide configuration and its
/// `updated_at` stamp, so any change to the assumptions yields a new key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(input: &ProjectionInput) -> LeaseProjectionResult<Self> {
        Ok(Fingerprint::from_bytes(&Fingerprint::canonical_bytes(input)?))
    }

    /// The JSON encoding a fingerprint is hashed from.
    pub fn canonical_bytes(input: &ProjectionInput) -> LeaseProjectionResult<Vec<u8>> {
        Ok(serde_json::to_vec(input)?)
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        Fingerprint(format!("{:016x}", fnv1a(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[inline(always)]
fn fnv1a(data: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for &b in data {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}
