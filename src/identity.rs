use std::cmp::Ordering;
use std::fmt;

use crate::error::{JviewError, Result};

/// 128-bit opaque identifier, as used for journal seqnum namespaces and
/// boot ids. Rendered as 32 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id128(pub [u8; 16]);

impl Id128 {
    pub const ZERO: Id128 = Id128([0; 16]);

    pub fn from_u128(value: u128) -> Self {
        Id128(value.to_be_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(JviewError::InvalidHex {
                value: s.to_string(),
            });
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| {
                JviewError::InvalidHex {
                    value: s.to_string(),
                }
            })?;
        }
        Ok(Id128(bytes))
    }

    pub fn to_hex(self) -> String {
        let mut out = String::with_capacity(32);
        for byte in self.0 {
            out.push_str(&format!("{:02x}", byte));
        }
        out
    }
}

impl fmt::Display for Id128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Identity of a single journal record: a sequence number scoped to a
/// namespace (one namespace per boot session).
///
/// Identities from different namespaces are incomparable, so only a
/// partial order is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordIdentity {
    pub namespace: Id128,
    pub sequence: u64,
}

impl RecordIdentity {
    pub fn new(namespace: Id128, sequence: u64) -> Self {
        Self {
            namespace,
            sequence,
        }
    }
}

impl PartialOrd for RecordIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.namespace != other.namespace {
            return None;
        }
        Some(self.sequence.cmp(&other.sequence))
    }
}
