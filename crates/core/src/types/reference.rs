//! Wallet transaction reference IDs.
//!
//! Reference IDs are human-readable tags of the form `TXN-` followed by the
//! last 8 digits of the creation time in epoch milliseconds and a 4-digit
//! zero-padded random suffix, e.g. `TXN-482910375204`. Generation lives in the
//! shop crate (it needs a clock and a random source); this type only validates
//! and carries the value. Uniqueness is enforced by a database constraint.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ReferenceId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceIdError {
    /// Missing the `TXN-` prefix.
    #[error("reference id must start with TXN-")]
    MissingPrefix,
    /// Wrong number of digits after the prefix.
    #[error("reference id must have {expected} digits after the prefix")]
    BadLength {
        /// Required digit count.
        expected: usize,
    },
    /// Non-digit characters after the prefix.
    #[error("reference id digits must be 0-9")]
    NonDigit,
}

/// A validated wallet transaction reference ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ReferenceId(String);

impl ReferenceId {
    /// Required prefix.
    pub const PREFIX: &'static str = "TXN-";

    /// Digits after the prefix: 8 from the timestamp, 4 random.
    pub const DIGITS: usize = 12;

    /// Parse a `ReferenceId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix, length, or digit constraint is violated.
    pub fn parse(s: &str) -> Result<Self, ReferenceIdError> {
        let digits = s
            .strip_prefix(Self::PREFIX)
            .ok_or(ReferenceIdError::MissingPrefix)?;

        if digits.len() != Self::DIGITS {
            return Err(ReferenceIdError::BadLength {
                expected: Self::DIGITS,
            });
        }

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReferenceIdError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Build a reference ID from its two components.
    ///
    /// `timestamp_part` is the last 8 digits of epoch milliseconds and
    /// `random_part` a value in `0..10_000`; both are zero-padded.
    #[must_use]
    pub fn from_parts(timestamp_part: u64, random_part: u16) -> Self {
        Self(format!(
            "{}{:08}{:04}",
            Self::PREFIX,
            timestamp_part % 100_000_000,
            random_part % 10_000
        ))
    }

    /// Returns the reference ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ReferenceId {
    type Err = ReferenceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ReferenceId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ReferenceId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ReferenceId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let id = ReferenceId::from_parts(1_724_900_123_456, 42);
        assert_eq!(id.as_str(), "TXN-001234560042");
        assert!(ReferenceId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_from_parts_pads_zeroes() {
        let id = ReferenceId::from_parts(7, 3);
        assert_eq!(id.as_str(), "TXN-000000070003");
    }

    #[test]
    fn test_parse_rejects_bad_prefix() {
        assert_eq!(
            ReferenceId::parse("REF-001234560042"),
            Err(ReferenceIdError::MissingPrefix)
        );
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert!(matches!(
            ReferenceId::parse("TXN-1234"),
            Err(ReferenceIdError::BadLength { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert_eq!(
            ReferenceId::parse("TXN-00123456004x"),
            Err(ReferenceIdError::NonDigit)
        );
    }
}
