use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::ValidationError;
use crate::id::{CustomerId, InvoiceId, ProductId};
use crate::money::Amount;
use crate::time::Timestamp;

/// One line of an invoice. `product_name` and `unit_price` are copied at
/// invoicing time so later catalog edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub qty: u64,
    pub unit_price: Amount,
}

impl InvoiceItem {
    /// `None` when the product does not fit in an [`Amount`].
    pub fn line_total(&self) -> Option<Amount> {
        self.unit_price.checked_mul(Decimal::from(self.qty))
    }
}

/// Sum of `qty × unit_price` over the items.
pub fn invoice_total(items: &[InvoiceItem]) -> Result<Amount, ValidationError> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| {
            item.line_total().and_then(|line| acc.checked_add(line))
        })
        .ok_or(ValidationError::AmountTooLarge)
}

/// An invoice document as stored by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub customer_id: CustomerId,
    pub items: Vec<InvoiceItem>,
    pub total: Amount,
    pub notes: String,
    pub date: Timestamp,
}

impl Entity for Invoice {
    type Id = InvoiceId;
    const NAME: &'static str = "invoice";

    fn id(&self) -> InvoiceId {
        self.id
    }
}

/// Payload of the create-invoice call.
///
/// The ledger does not verify `total`; it is computed here, once, from the
/// items and submitted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub customer_id: CustomerId,
    pub items: Vec<InvoiceItem>,
    pub total: Amount,
    pub notes: String,
}

impl NewInvoice {
    pub fn from_items(
        customer_id: CustomerId,
        items: Vec<InvoiceItem>,
        notes: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let total = invoice_total(&items)?;
        Ok(Self {
            customer_id,
            items,
            total,
            notes: notes.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, price: i64, qty: u64) -> InvoiceItem {
        InvoiceItem {
            product_id: ProductId::new(id),
            product_name: format!("product-{id}"),
            qty,
            unit_price: Decimal::from(price),
        }
    }

    #[test]
    fn total_is_sum_of_line_totals() {
        let items = vec![item(1, 100, 2), item(2, 50, 3)];
        assert_eq!(invoice_total(&items), Ok(Decimal::from(350)));
    }

    #[test]
    fn new_invoice_carries_the_computed_total() {
        let invoice = NewInvoice::from_items(CustomerId::new(3), vec![item(1, 100, 2), item(2, 50, 3)], "").unwrap();
        assert_eq!(invoice.total, Decimal::from(350));
    }

    #[test]
    fn fractional_prices_stay_exact() {
        let items = vec![InvoiceItem {
            unit_price: Decimal::new(1999, 2),
            ..item(1, 0, 3)
        }];
        assert_eq!(invoice_total(&items), Ok(Decimal::new(5997, 2)));
    }

    #[test]
    fn empty_invoice_totals_zero() {
        assert_eq!(invoice_total(&[]), Ok(Decimal::ZERO));
    }

    #[test]
    fn oversized_totals_are_rejected_instead_of_overflowing() {
        let line = InvoiceItem {
            unit_price: Decimal::MAX,
            ..item(1, 0, 2)
        };
        assert_eq!(line.line_total(), None);
        assert_eq!(invoice_total(&[line.clone()]), Err(ValidationError::AmountTooLarge));

        let halves = vec![
            InvoiceItem { qty: 1, ..line.clone() },
            InvoiceItem { qty: 1, ..line },
        ];
        assert_eq!(
            NewInvoice::from_items(CustomerId::new(1), halves, ""),
            Err(ValidationError::AmountTooLarge)
        );
    }
}
