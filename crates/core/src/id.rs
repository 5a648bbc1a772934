//! Strongly-typed identifiers.
//!
//! All identifiers are 64-bit integers assigned and owned by the remote
//! ledger. The client never mints them; it only carries them around.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Identifier of a product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

/// Identifier of a customer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(u64);

/// Identifier of an invoice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(u64);

/// Identifier of an expense.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(u64);

/// Identifier of a sale ledger entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleId(u64);

macro_rules! impl_ledger_id {
    ($t:ident, $name:literal) => {
        impl $t {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = crate::error::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| crate::error::ValidationError::not_a_number($name, s))
            }
        }
    };
}

impl_ledger_id!(ProductId, "product id");
impl_ledger_id!(CustomerId, "customer id");
impl_ledger_id!(InvoiceId, "invoice id");
impl_ledger_id!(ExpenseId, "expense id");
impl_ledger_id!(SaleId, "sale id");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn ids_parse_from_selection_values() {
        assert_eq!("42".parse::<CustomerId>().unwrap(), CustomerId::new(42));
        assert_eq!(" 7 ".parse::<ProductId>().unwrap().get(), 7);
    }

    #[test]
    fn malformed_ids_are_validation_errors() {
        let err = "abc".parse::<InvoiceId>().unwrap_err();
        assert!(matches!(err, ValidationError::NotANumber { field: "invoice id", .. }));
    }
}
