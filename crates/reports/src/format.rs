use rust_decimal::Decimal;

use tillbook_core::Amount;

pub const DEFAULT_CURRENCY: &str = "PKR";

/// `1234567.5` → `"1,234,567.5"`. Rounded to two decimal places, trailing
/// zeros dropped, no sign.
pub fn group_digits(amount: Amount) -> String {
    let text = amount.abs().round_dp(2).normalize().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// `"PKR 1,234"`, or `"-PKR 200"` for negative amounts.
pub fn format_amount(currency: &str, amount: Amount) -> String {
    let digits = group_digits(amount);
    if amount.round_dp(2) < Decimal::ZERO {
        format!("-{currency} {digits}")
    } else {
        format!("{currency} {digits}")
    }
}
