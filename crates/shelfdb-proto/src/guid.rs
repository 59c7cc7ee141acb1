//! 128-bit opaque identifiers.
//!
//! Every persisted row is keyed by a 16-byte GUID. A single reserved byte
//! pattern stands in for "no reference" so that foreign-key columns never
//! need a nullable type. Identifiers are compared by their two big-endian
//! 64-bit halves; storage is canonical, so structural equality suffices.

use crate::error::Error;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Byte pattern of the reserved "no reference" identifier.
const RESERVED_BYTES: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, //
    0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// String form of the reserved identifier.
pub const RESERVED_GUID_STR: &str = "00000000FFFFFFFF00000000FFFFFFFF";

/// A 16-byte globally unique identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid([u8; 16]);

impl Guid {
    /// The reserved sentinel identifier ("no reference").
    pub const fn reserved() -> Self {
        Self(RESERVED_BYTES)
    }

    /// Generate a fresh identifier from the OS cryptographic source.
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Generate an entity-tagged identifier.
    ///
    /// Byte 0 carries the entity tag and the last four bytes the current
    /// Unix timestamp, so fresh identifiers sort loosely by type and
    /// creation time while the middle eleven bytes keep them unique.
    pub fn tagged(tag: u8) -> Self {
        let mut guid = Self::random();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        guid.0[0] = tag;
        guid.0[12..16].copy_from_slice(&((now & 0xFFFF_FFFF) as u32).to_be_bytes());
        guid
    }

    /// Parse the 32-hex-character string form.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s).map_err(|_| Error::InvalidGuid(s.to_string()))?;
        let bytes: [u8; 16] = bytes
            .try_into()
            .map_err(|_| Error::InvalidGuid(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// Build an identifier from its two big-endian halves.
    pub fn from_pair(high: u64, low: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&high.to_be_bytes());
        bytes[8..16].copy_from_slice(&low.to_be_bytes());
        Self(bytes)
    }

    /// The upper 64 bits, big-endian.
    pub fn high(&self) -> u64 {
        u64::from_be_bytes(self.0[0..8].try_into().expect("8 bytes"))
    }

    /// The lower 64 bits, big-endian.
    pub fn low(&self) -> u64 {
        u64::from_be_bytes(self.0[8..16].try_into().expect("8 bytes"))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// False only for the reserved sentinel.
    pub fn is_valid(&self) -> bool {
        self.0 != RESERVED_BYTES
    }

    /// True only for the reserved sentinel.
    pub fn is_reserved(&self) -> bool {
        !self.is_valid()
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::reserved()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [0u8; 32];
        hex::encode_to_slice(self.0, &mut out).expect("32-byte buffer");
        for b in &mut out {
            b.make_ascii_uppercase();
        }
        f.write_str(std::str::from_utf8(&out).expect("hex is ascii"))
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GuidVisitor;

        impl Visitor<'_> for GuidVisitor {
            type Value = Guid;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 32-character hex string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Guid, E> {
                Guid::parse(v).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(GuidVisitor)
    }
}
