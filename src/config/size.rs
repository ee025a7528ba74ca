//! Human-readable byte sizes ("10KB", "2KiB", "512").
//!
//! Decimal units are powers of 1000, binary units (`KiB`, `MiB`, ...) are
//! powers of 1024. Units are case-insensitive and the trailing `B` is
//! optional.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Error returned when a size string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SizeParseError {
    #[error("size is empty")]
    Empty,
    #[error("invalid number in size {0:?}")]
    InvalidNumber(String),
    #[error("unknown size unit {0:?}")]
    UnknownUnit(String),
}

/// A byte count parsed from a humanized string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}B", self.0)
    }
}

impl FromStr for ByteSize {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SizeParseError::Empty);
        }

        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let multiplier = unit_multiplier(unit.trim())
            .ok_or_else(|| SizeParseError::UnknownUnit(unit.trim().to_string()))?;

        if let Ok(whole) = number.parse::<u64>() {
            return whole
                .checked_mul(multiplier)
                .map(ByteSize)
                .ok_or_else(|| SizeParseError::InvalidNumber(s.to_string()));
        }

        let fractional: f64 = number
            .parse()
            .map_err(|_| SizeParseError::InvalidNumber(s.to_string()))?;
        let bytes = fractional * multiplier as f64;
        if !bytes.is_finite() || bytes < 0.0 || bytes > u64::MAX as f64 {
            return Err(SizeParseError::InvalidNumber(s.to_string()));
        }
        Ok(ByteSize(bytes.round() as u64))
    }
}

fn unit_multiplier(unit: &str) -> Option<u64> {
    let unit = unit.to_ascii_lowercase();
    let unit = unit.strip_suffix('b').unwrap_or(&unit);
    let multiplier = match unit {
        "" => 1,
        "k" => 1_000,
        "ki" => 1 << 10,
        "m" => 1_000_000,
        "mi" => 1 << 20,
        "g" => 1_000_000_000,
        "gi" => 1 << 30,
        "t" => 1_000_000_000_000,
        "ti" => 1 << 40,
        _ => return None,
    };
    Some(multiplier)
}

/// Serde helper accepting either a plain integer or a humanized string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Bytes(u64),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Bytes(bytes) => Ok(bytes),
        Repr::Text(text) => text
            .parse::<ByteSize>()
            .map(ByteSize::as_u64)
            .map_err(serde::de::Error::custom),
    }
}
