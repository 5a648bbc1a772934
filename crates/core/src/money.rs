//! Monetary amounts and quantity parsing.

use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::ValidationError;

/// A decimal amount in the single currency unit of the business.
pub type Amount = Decimal;

/// Parse a user-entered amount. Rejects blank, non-numeric and negative input.
pub fn parse_amount(field: &'static str, input: &str) -> Result<Amount, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::not_a_number(field, input))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::Negative { field });
    }
    Ok(amount.normalize())
}

/// Sum of stored amounts. Clamps at [`Decimal::MAX`] instead of panicking,
/// since records already in the ledger cannot be rejected.
pub fn sum_amounts(amounts: impl IntoIterator<Item = Amount>) -> Amount {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Parse a whole-unit quantity. Blank input counts as zero, fractions are
/// truncated.
pub fn parse_quantity(field: &'static str, input: &str) -> Result<u64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    let value =
        Decimal::from_str(trimmed).map_err(|_| ValidationError::not_a_number(field, input))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::Negative { field });
    }
    value
        .trunc()
        .to_u64()
        .ok_or_else(|| ValidationError::not_a_number(field, input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn amounts_accept_plain_decimals() {
        assert_eq!(parse_amount("price", " 120.50 ").unwrap(), Decimal::new(1205, 1));
        assert_eq!(parse_amount("price", "0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn amounts_reject_text_and_negatives() {
        assert_eq!(
            parse_amount("amount", "twelve"),
            Err(ValidationError::not_a_number("amount", "twelve"))
        );
        assert_eq!(
            parse_amount("amount", "-5"),
            Err(ValidationError::Negative { field: "amount" })
        );
        assert_eq!(parse_amount("amount", "  "), Err(ValidationError::required("amount")));
    }

    #[test]
    fn quantities_truncate_and_default_to_zero() {
        assert_eq!(parse_quantity("quantity", "").unwrap(), 0);
        assert_eq!(parse_quantity("quantity", "7.9").unwrap(), 7);
        assert!(parse_quantity("quantity", "-1").is_err());
        assert!(parse_quantity("quantity", "lots").is_err());
    }

    #[test]
    fn sums_clamp_at_the_largest_amount() {
        assert_eq!(sum_amounts([Decimal::MAX, Decimal::ONE]), Decimal::MAX);
        assert_eq!(sum_amounts([Decimal::from(2), Decimal::new(5, 1)]), Decimal::new(25, 1));
        assert_eq!(sum_amounts([]), Decimal::ZERO);
    }

    proptest! {
        /// Property: any non-negative integer amount parses back to itself.
        #[test]
        fn integer_amounts_round_trip(value in 0u64..10_000_000u64) {
            let parsed = parse_amount("amount", &value.to_string()).unwrap();
            prop_assert_eq!(parsed, Decimal::from(value));
        }
    }
}
