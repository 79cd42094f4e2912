//! Exact monetary amounts backed by decimal arithmetic.
//!
//! Wallet balances and prices are stored in rupees with two decimal places.
//! `Money` wraps [`rust_decimal::Decimal`] so arithmetic never goes through
//! floating point, and addition/subtraction is checked.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors from monetary arithmetic.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MoneyError {
    /// Addition or multiplication overflowed the decimal range.
    #[error("monetary amount overflow")]
    Overflow,
    /// Subtraction would produce a negative amount.
    #[error("monetary amount would be negative")]
    Negative,
}

/// A monetary amount in rupees.
///
/// Amounts are non-negative by construction except via [`Money::from_decimal`],
/// which callers use when loading database values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Money` from a raw decimal.
    #[must_use]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a `Money` from whole rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Get the underlying decimal value.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Whether this amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the sum exceeds the decimal range.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction that refuses to go negative.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Negative` if `other` exceeds `self`.
    pub fn checked_sub(self, other: Self) -> Result<Self, MoneyError> {
        if other.0 > self.0 {
            return Err(MoneyError::Negative);
        }
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(MoneyError::Negative)
    }

    /// Multiply by a line quantity.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if the product exceeds the decimal range.
    pub fn checked_mul_quantity(self, quantity: u32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Format as a display string with the rupee sign, e.g. `₹1250.00`.
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("₹{:.2}", self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

// SQLx support (with postgres feature): maps to NUMERIC via Decimal.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_add() {
        let a = Money::from_rupees(100);
        let b = Money::from_rupees(60);
        assert_eq!(a.checked_add(b).unwrap(), Money::from_rupees(160));
    }

    #[test]
    fn test_checked_sub_refuses_negative() {
        let a = Money::from_rupees(40);
        let b = Money::from_rupees(100);
        assert_eq!(a.checked_sub(b), Err(MoneyError::Negative));
        // Original amount untouched (Copy semantics, but the check matters)
        assert_eq!(b.checked_sub(a).unwrap(), Money::from_rupees(60));
    }

    #[test]
    fn test_mul_quantity() {
        let price = Money::from_decimal(Decimal::new(2550, 2)); // 25.50
        assert_eq!(
            price.checked_mul_quantity(3).unwrap(),
            Money::from_decimal(Decimal::new(7650, 2))
        );
    }

    #[test]
    fn test_formatted() {
        assert_eq!(Money::from_rupees(1250).formatted(), "₹1250.00");
        assert_eq!(
            Money::from_decimal(Decimal::new(999, 2)).formatted(),
            "₹9.99"
        );
    }

    #[test]
    fn test_ordering() {
        assert!(Money::from_rupees(50) > Money::from_rupees(10));
        assert!(Money::ZERO.is_zero());
        assert!(!Money::ZERO.is_positive());
        assert!(Money::from_rupees(1).is_positive());
    }

    #[test]
    fn test_serde_roundtrip() {
        let money = Money::from_rupees(500);
        let json = serde_json::to_string(&money).unwrap();
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, money);
    }
}
