//! Cart → Invoice → Sale.
//!
//! Orchestrates the flow:
//! 1. Validate the request (customer chosen, cart not empty)
//! 2. Create the invoice with the total computed from the cart
//! 3. Record the sale for that invoice, customer and total
//!
//! The ledger has no cross-record transaction. When step 3 fails after step 2
//! succeeded, the invoice stays (it is the authoritative document) and the
//! caller gets a [`PartialTransactionError`] to retry only the sale with
//! [`InvoiceTransactionOrchestrator::retry_sale`].

use rust_decimal::Decimal;

use tillbook_core::{
    Amount, CustomerId, Invoice, InvoiceItem, NewInvoice, NewSale, PartialTransactionError,
    Product, ProductId, RemoteError, Sale, SyncError, ValidationError, invoice_total,
};
use tillbook_store::EntityStore;

use crate::mutation::MutationCoordinator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Amount,
    pub qty: u64,
}

impl CartLine {
    /// `None` when the product does not fit in an [`Amount`].
    pub fn line_total(&self) -> Option<Amount> {
        self.unit_price.checked_mul(Decimal::from(self.qty))
    }
}

/// Products picked for one invoice. Adding a product already in the cart
/// increases its quantity; the price is the one captured when first added.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// A quantity of zero counts as one.
    pub fn add(&mut self, product: &Product, qty: u64) {
        let qty = qty.max(1);
        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => line.qty = line.qty.saturating_add(qty),
            None => self.lines.push(CartLine {
                product_id: product.id,
                product_name: product.name.clone(),
                unit_price: product.price,
                qty,
            }),
        }
    }

    /// Setting a quantity of zero removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, qty: u64) {
        if qty == 0 {
            self.remove(product_id);
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.qty = qty;
        }
    }

    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn total(&self) -> Result<Amount, ValidationError> {
        invoice_total(&self.to_items())
    }

    pub fn to_items(&self) -> Vec<InvoiceItem> {
        self.lines
            .iter()
            .map(|l| InvoiceItem {
                product_id: l.product_id,
                product_name: l.product_name.clone(),
                qty: l.qty,
                unit_price: l.unit_price,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckoutRequest {
    pub customer_id: Option<CustomerId>,
    pub cart: Cart,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub invoice: Invoice,
    pub sale: Sale,
}

pub struct InvoiceTransactionOrchestrator<S> {
    coordinator: MutationCoordinator<S>,
}

impl<S> Clone for InvoiceTransactionOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
        }
    }
}

impl<S> InvoiceTransactionOrchestrator<S>
where
    S: EntityStore + 'static,
{
    pub fn new(coordinator: MutationCoordinator<S>) -> Self {
        Self { coordinator }
    }

    /// Errors:
    /// - `Validation`: nothing was sent
    /// - `Remote`: the invoice was not created; nothing exists remotely
    /// - `PartialTransaction`: the invoice exists, the sale does not
    ///
    /// Once validation passes, both ledger steps run on their own task:
    /// dropping the returned future does not leave an invoice without its
    /// sale attempt.
    pub async fn submit(&self, request: CheckoutRequest) -> Result<CheckoutReceipt, SyncError> {
        let customer_id = request.customer_id.ok_or(ValidationError::MissingCustomer)?;
        if request.cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        let new_invoice =
            NewInvoice::from_items(customer_id, request.cart.to_items(), request.notes.trim())?;

        let coordinator = self.coordinator.clone();
        let task = tokio::spawn(async move { record(coordinator, new_invoice).await });
        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(customer_id = %customer_id, error = %err, "checkout: task did not finish");
                Err(RemoteError::Transport(format!("checkout did not finish: {err}")).into())
            }
        }
    }

    /// Re-issue only the missing sale. A further failure comes back as the
    /// same partial transaction with the new cause.
    pub async fn retry_sale(&self, partial: &PartialTransactionError) -> Result<Sale, SyncError> {
        match self.coordinator.create_sale(partial.pending_sale.clone()).await {
            Ok(sale) => {
                tracing::info!(
                    invoice_number = %partial.invoice.invoice_number,
                    sale_id = %sale.id,
                    "checkout: sale recorded on retry"
                );
                Ok(sale)
            }
            Err(source) => {
                tracing::warn!(
                    invoice_number = %partial.invoice.invoice_number,
                    error = %source,
                    "checkout: sale retry failed"
                );
                Err(PartialTransactionError {
                    source,
                    ..partial.clone()
                }
                .into())
            }
        }
    }
}

/// Steps 2 and 3: the invoice, then its sale.
async fn record<S>(
    coordinator: MutationCoordinator<S>,
    new_invoice: NewInvoice,
) -> Result<CheckoutReceipt, SyncError>
where
    S: EntityStore + 'static,
{
    let customer_id = new_invoice.customer_id;
    tracing::info!(
        customer_id = %customer_id,
        lines = new_invoice.items.len(),
        total = %new_invoice.total,
        "checkout: creating invoice"
    );
    let invoice = coordinator.create_invoice(new_invoice).await?;

    let pending_sale = NewSale {
        customer_id,
        invoice_id: invoice.id,
        amount: invoice.total,
    };
    match coordinator.create_sale(pending_sale.clone()).await {
        Ok(sale) => {
            tracing::info!(
                invoice_number = %invoice.invoice_number,
                sale_id = %sale.id,
                "checkout: completed"
            );
            Ok(CheckoutReceipt { invoice, sale })
        }
        Err(source) => {
            tracing::warn!(
                invoice_number = %invoice.invoice_number,
                error = %source,
                "checkout: invoice created but sale failed"
            );
            Err(PartialTransactionError {
                invoice,
                pending_sale,
                source,
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tillbook_core::Timestamp;

    fn product(id: u64, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            price: Decimal::from(price),
            quantity: 10,
            image_url: String::new(),
            category: String::new(),
            description: String::new(),
            unit: String::new(),
            barcode: String::new(),
            created_at: Timestamp::default(),
        }
    }

    #[test]
    fn cart_total_matches_invoice_total() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100), 2);
        cart.add(&product(2, 50), 3);
        assert_eq!(cart.total(), Ok(Decimal::from(350)));
    }

    #[test]
    fn adding_the_same_product_merges_lines() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100), 2);
        cart.add(&product(1, 100), 0);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].qty, 3);
    }

    #[test]
    fn zero_quantity_removes_a_line() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100), 2);
        cart.add(&product(2, 10), 1);
        cart.set_quantity(ProductId::new(1), 0);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Ok(Decimal::from(10)));
    }

    #[test]
    fn oversized_cart_total_is_a_validation_error() {
        let price = tillbook_core::parse_amount("price", "79228162514264337593543950335").unwrap();
        let qty = tillbook_core::parse_quantity("quantity", "2").unwrap();
        let mut cart = Cart::new();
        cart.add(&Product { price, ..product(1, 0) }, qty);

        assert_eq!(cart.lines()[0].line_total(), None);
        assert_eq!(cart.total(), Err(ValidationError::AmountTooLarge));
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

        #[test]
        fn cart_total_is_sum_of_lines(lines in proptest::collection::vec((1u64..20, 0i64..10_000, 0u64..50), 0..30)) {
            let mut cart = Cart::new();
            for (id, price, qty) in &lines {
                cart.add(&product(*id, *price), *qty);
            }
            let expected: Decimal = cart.lines().iter().filter_map(CartLine::line_total).sum();
            prop_assert_eq!(cart.total(), Ok(expected));
            prop_assert!(cart.lines().iter().all(|l| l.qty > 0));
        }
    }
}
