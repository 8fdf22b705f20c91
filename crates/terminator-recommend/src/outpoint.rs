//! Channel outpoints: the funding transaction hash plus output index that
//! identify a channel.
//!
//! Outpoints are written as `<txid>:<index>`, where the transaction id is the
//! byte-reversed hex form used for display by Bitcoin tooling.

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

const HASH_SIZE: usize = 32;
const MAX_HASH_STRING_SIZE: usize = HASH_SIZE * 2;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseHashError {
    #[display("hash string is {len} characters, max is 64")]
    TooLong { len: usize },
    #[display("hash string contains a non-hex character")]
    InvalidHex,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseOutPointError {
    #[display("expected 2 parts of channel point, got: {found}")]
    PartCount { found: usize },
    #[display("invalid output index: {_0}")]
    Index(ParseIntError),
    #[display("invalid transaction hash: {_0}")]
    Hash(ParseHashError),
}

/// A 32-byte transaction hash, stored in internal (little-endian) byte order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxHash([u8; HASH_SIZE]);

impl TxHash {
    #[must_use]
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = ParseHashError;

    /// Parses a display-order hex string.
    ///
    /// Short strings are zero-extended on the most significant side, and an odd
    /// number of digits is read as if it had a leading `0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_HASH_STRING_SIZE {
            return Err(ParseHashError::TooLong { len: s.len() });
        }

        let mut digits = s
            .bytes()
            .map(|c| hex_digit(c).ok_or(ParseHashError::InvalidHex))
            .collect::<Result<Vec<_>, _>>()?;
        if digits.len() % 2 == 1 {
            digits.insert(0, 0);
        }

        // `digits` is big-endian, the stored hash is little-endian.
        let mut bytes = [0; HASH_SIZE];
        for (i, pair) in digits.rchunks(2).enumerate() {
            bytes[i] = (pair[0] << 4) | pair[1];
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter().rev() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Identifies a channel by its funding output.
///
/// # Examples
///
/// ```
/// use terminator_recommend::outpoint::OutPoint;
///
/// let outpoint: OutPoint = "ab:1".parse().unwrap();
/// assert_eq!(outpoint.index, 1);
/// assert!("ab".parse::<OutPoint>().is_err());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutPoint {
    pub hash: TxHash,
    pub index: u32,
}

impl FromStr for OutPoint {
    type Err = ParseOutPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(':').collect::<Vec<_>>();
        let [hash, index] = parts[..] else {
            return Err(ParseOutPointError::PartCount { found: parts.len() });
        };

        let index = index.parse::<u32>().map_err(ParseOutPointError::Index)?;
        let hash = hash.parse::<TxHash>().map_err(ParseOutPointError::Hash)?;
        Ok(Self { hash, index })
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.index)
    }
}

impl Serialize for OutPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OutPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid outpoint {s:?}: {e}")))
    }
}
