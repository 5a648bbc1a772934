//! Demo entry point: runs a checkout against an in-process ledger and prints
//! the resulting dashboard.

use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;

use tillbook_client::{AppContext, Cart, CheckoutRequest, ClientConfig, InMemoryPreferenceStore};
use tillbook_core::{CustomerDraft, ExpenseDraft, ProductDraft, ProductForm, UserProfile};
use tillbook_store::InMemoryLedger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env();
    tillbook_observability::tracing::init(&config.log_options());

    let ledger = Arc::new(InMemoryLedger::new());
    let ctx = AppContext::new(ledger, config, Arc::new(InMemoryPreferenceStore::new()));
    let mutations = ctx.mutations();

    mutations
        .save_profile(UserProfile {
            name: "Owner".to_string(),
        })
        .await
        .context("failed to save profile")?;

    let tea = mutations
        .create_product(ProductDraft {
            name: "Green Tea".to_string(),
            price: Decimal::from(100),
            quantity: 40,
            category: "Beverages".to_string(),
            ..ProductDraft::default()
        })
        .await
        .context("failed to create product")?;
    let biscuits = mutations
        .create_product(ProductDraft {
            name: "Biscuits".to_string(),
            price: Decimal::from(50),
            quantity: 3,
            category: "Snacks".to_string(),
            ..ProductDraft::default()
        })
        .await
        .context("failed to create product")?;
    let customer = mutations
        .create_customer(CustomerDraft {
            name: "Walk-in".to_string(),
            phone: String::new(),
        })
        .await
        .context("failed to create customer")?;
    mutations
        .create_expense(ExpenseDraft {
            amount: Decimal::from(120),
            category: "Utilities".to_string(),
            description: "Electricity".to_string(),
        })
        .await
        .context("failed to record expense")?;

    // Restock through the edit form, as the products screen does.
    let mut restock = ProductForm::from_product(&biscuits);
    restock.quantity = "12".to_string();
    let draft = restock.parse().context("invalid restock form")?;
    let biscuits = mutations
        .update_product(biscuits.id, draft)
        .await
        .context("failed to restock product")?;

    let mut cart = Cart::new();
    cart.add(&tea, 2);
    cart.add(&biscuits, 3);
    let receipt = ctx
        .checkout()
        .submit(CheckoutRequest {
            customer_id: Some(customer.id),
            cart,
            notes: String::new(),
        })
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))?;

    let queries = ctx.queries();
    println!(
        "{} issued for {}",
        receipt.invoice.invoice_number,
        queries.format_amount(receipt.invoice.total)
    );

    let dashboard = queries.dashboard().await.context("failed to load dashboard")?;
    for card in &dashboard.cards {
        println!("{:<16} {}", card.label, card.value);
    }
    for product in &dashboard.low_stock {
        println!("low stock: {} ({} {})", product.name, product.quantity, product.unit_label());
    }

    for product in queries.search_products("tea", None).await.context("failed to search products")? {
        println!("found: {} at {}", product.name, queries.format_amount(product.price));
    }

    let month = queries.current_month();
    let summary = queries
        .profit_loss_summary(month)
        .await
        .context("failed to load profit/loss")?;
    println!("{}: {}", summary.title(), queries.format_amount(summary.profit));

    ctx.end_session();
    Ok(())
}
