//! Black-box flows through the public client API against the in-memory
//! ledger.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use tillbook_cache::{QueryCache, QueryKey};
use tillbook_client::{
    AppContext, Cart, CheckoutRequest, ClientConfig, InMemoryPreferenceStore, MutationCoordinator,
};
use tillbook_core::{
    Customer, CustomerDraft, Operation, Product, ProductDraft, RemoteError, SyncError,
    ValidationError,
};
use tillbook_store::{EntityStore, InMemoryLedger, SessionGate, StaticSession};

struct Harness {
    ledger: Arc<InMemoryLedger>,
    ctx: AppContext<InMemoryLedger>,
}

impl Harness {
    fn new() -> Self {
        tillbook_observability::tracing::init_for_tests();
        let ledger = Arc::new(InMemoryLedger::new());
        let ctx = AppContext::new(
            ledger.clone(),
            ClientConfig::default(),
            Arc::new(InMemoryPreferenceStore::new()),
        );
        Self { ledger, ctx }
    }

    async fn product(&self, name: &str, price: i64) -> Product {
        self.ctx
            .mutations()
            .create_product(ProductDraft {
                name: name.to_string(),
                price: Decimal::from(price),
                quantity: 20,
                ..ProductDraft::default()
            })
            .await
            .unwrap()
    }

    async fn customer(&self, name: &str) -> Customer {
        self.ctx
            .mutations()
            .create_customer(CustomerDraft {
                name: name.to_string(),
                phone: String::new(),
            })
            .await
            .unwrap()
    }

    async fn request(&self) -> CheckoutRequest {
        let tea = self.product("Tea", 100).await;
        let sugar = self.product("Sugar", 50).await;
        let customer = self.customer("Ayesha").await;
        let mut cart = Cart::new();
        cart.add(&tea, 2);
        cart.add(&sugar, 3);
        CheckoutRequest {
            customer_id: Some(customer.id),
            cart,
            notes: "  paid cash ".to_string(),
        }
    }
}

#[tokio::test]
async fn checkout_creates_invoice_then_sale_with_the_same_total() {
    let h = Harness::new();
    let request = h.request().await;

    let receipt = h.ctx.checkout().submit(request).await.unwrap();

    assert_eq!(receipt.invoice.total, Decimal::from(350));
    assert_eq!(receipt.invoice.invoice_number, "INV-0001");
    assert_eq!(receipt.invoice.notes, "paid cash");
    assert_eq!(receipt.sale.invoice_id, receipt.invoice.id);
    assert_eq!(receipt.sale.customer_id, receipt.invoice.customer_id);
    assert_eq!(receipt.sale.amount, Decimal::from(350));
}

#[tokio::test]
async fn sale_failure_after_invoice_is_a_partial_transaction() {
    let h = Harness::new();
    let request = h.request().await;
    h.ledger.fail_next(
        Operation::CreateSale,
        RemoteError::Transport("connection reset".to_string()),
    );

    let err = h.ctx.checkout().submit(request).await.unwrap_err();

    let partial = err.as_partial().expect("partial transaction").clone();
    assert!(!matches!(err, SyncError::Remote(_)));
    assert_eq!(partial.pending_sale.invoice_id, partial.invoice.id);
    assert_eq!(partial.pending_sale.amount, Decimal::from(350));

    // The invoice stays retrievable on its own.
    let stored = h.ctx.queries().invoice(partial.invoice.id).await.unwrap();
    assert_eq!(stored, partial.invoice);
    assert_eq!(h.ledger.record_counts().sales, 0);

    let sale = h.ctx.checkout().retry_sale(&partial).await.unwrap();
    assert_eq!(sale.invoice_id, partial.invoice.id);
    assert_eq!(h.ledger.calls(Operation::CreateInvoice), 1);
    assert_eq!(h.ledger.record_counts().invoices, 1);
    assert_eq!(h.ledger.record_counts().sales, 1);
}

#[tokio::test]
async fn failed_retry_stays_partial() {
    let h = Harness::new();
    let request = h.request().await;
    h.ledger.fail_always(
        Operation::CreateSale,
        RemoteError::rejected(Operation::CreateSale, "out of cycles"),
    );

    let err = h.ctx.checkout().submit(request).await.unwrap_err();
    let partial = err.as_partial().unwrap().clone();
    let again = h.ctx.checkout().retry_sale(&partial).await.unwrap_err();

    let retried = again.as_partial().unwrap();
    assert_eq!(retried.invoice, partial.invoice);
    assert_eq!(h.ledger.calls(Operation::CreateInvoice), 1);
    assert!(again.user_message().contains("INV-0001"));
}

#[tokio::test]
async fn invoice_failure_creates_nothing() {
    let h = Harness::new();
    let request = h.request().await;
    h.ledger.fail_next(
        Operation::CreateInvoice,
        RemoteError::Transport("timeout".to_string()),
    );

    let err = h.ctx.checkout().submit(request).await.unwrap_err();

    assert!(matches!(err, SyncError::Remote(RemoteError::Transport(_))));
    assert_eq!(h.ledger.calls(Operation::CreateSale), 0);
    assert_eq!(h.ledger.record_counts().invoices, 0);
}

#[tokio::test]
async fn invalid_checkout_issues_no_remote_call() {
    let h = Harness::new();
    let mut request = h.request().await;
    h.ledger.reset_calls();

    let missing_customer = CheckoutRequest {
        customer_id: None,
        ..request.clone()
    };
    let err = h.ctx.checkout().submit(missing_customer).await.unwrap_err();
    assert_eq!(err, SyncError::Validation(ValidationError::MissingCustomer));

    request.cart.clear();
    let err = h.ctx.checkout().submit(request).await.unwrap_err();
    assert_eq!(err, SyncError::Validation(ValidationError::EmptyCart));

    assert_eq!(h.ledger.total_calls(), 0);
}

#[tokio::test]
async fn oversized_total_is_rejected_before_any_call() {
    let h = Harness::new();
    let customer = h.customer("Ayesha").await;
    let gold = h.product("Gold", 1).await;
    let gold = Product {
        price: Decimal::MAX,
        ..gold
    };
    let mut cart = Cart::new();
    cart.add(&gold, 2);
    h.ledger.reset_calls();

    let err = h
        .ctx
        .checkout()
        .submit(CheckoutRequest {
            customer_id: Some(customer.id),
            cart,
            notes: String::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, SyncError::Validation(ValidationError::AmountTooLarge));
    assert_eq!(h.ledger.total_calls(), 0);
}

#[tokio::test]
async fn abandoned_checkout_still_records_the_sale() {
    let h = Harness::new();
    let request = h.request().await;
    h.ctx.queries().dashboard().await.unwrap();
    h.ledger.set_latency(Some(Duration::from_millis(30)));

    let abandoned =
        tokio::time::timeout(Duration::from_millis(10), h.ctx.checkout().submit(request)).await;
    assert!(abandoned.is_err());
    tokio::time::sleep(Duration::from_millis(250)).await;

    let counts = h.ledger.record_counts();
    assert_eq!(counts.invoices, 1);
    assert_eq!(counts.sales, 1);
    assert!(h.ctx.cache().snapshot(&QueryKey::DashboardStats).is_stale);
}

/// `dueAmount` is a manual ledger: invoicing never changes it.
#[tokio::test]
async fn invoicing_leaves_due_amount_alone() {
    let h = Harness::new();
    let request = h.request().await;
    let customer_id = request.customer_id.unwrap();

    h.ctx.checkout().submit(request).await.unwrap();

    let customer = h.ctx.queries().customer(customer_id).await.unwrap();
    assert_eq!(customer.due_amount, Decimal::ZERO);
}

#[tokio::test]
async fn failed_write_leaves_cached_bytes_unchanged() {
    let h = Harness::new();
    h.product("Tea", 100).await;
    let cache = h.ctx.cache();
    let before = cache.fetch_or_cached(&QueryKey::Products).await.unwrap();
    let before_bytes = serde_json::to_vec(&*before).unwrap();

    h.ledger.fail_next(
        Operation::CreateProduct,
        RemoteError::rejected(Operation::CreateProduct, "trap"),
    );
    assert!(h
        .ctx
        .mutations()
        .create_product(ProductDraft {
            name: "Salt".to_string(),
            ..ProductDraft::default()
        })
        .await
        .is_err());

    let after = cache.peek(&QueryKey::Products).unwrap();
    assert_eq!(serde_json::to_vec(&*after).unwrap(), before_bytes);
    assert!(!cache.snapshot(&QueryKey::Products).is_stale);
}

#[tokio::test]
async fn checkout_marks_dashboard_stale_but_not_products() {
    let h = Harness::new();
    let request = h.request().await;
    let queries = h.ctx.queries();
    queries.dashboard().await.unwrap();

    h.ctx.checkout().submit(request).await.unwrap();

    let cache = h.ctx.cache();
    assert!(cache.snapshot(&QueryKey::DashboardStats).is_stale);
    assert!(!cache.snapshot(&QueryKey::Products).is_stale);
    assert!(!cache.contains(&QueryKey::Sales));

    let fresh = cache.fetch_latest(&QueryKey::DashboardStats).await.unwrap();
    assert_eq!(
        fresh.as_dashboard_stats().unwrap().total_sales_amount,
        Decimal::from(350)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_reads_of_a_stale_key_issue_one_call() {
    let h = Harness::new();
    h.product("Tea", 100).await;
    let cache = h.ctx.cache().clone();
    cache.fetch_or_cached(&QueryKey::Products).await.unwrap();
    h.product("Sugar", 50).await;
    h.ledger.set_latency(Some(Duration::from_millis(30)));
    h.ledger.reset_calls();

    let a = tokio::spawn({
        let cache = cache.clone();
        async move { cache.fetch_latest(&QueryKey::Products).await }
    });
    let b = tokio::spawn({
        let cache = cache.clone();
        async move { cache.fetch_latest(&QueryKey::Products).await }
    });
    let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());

    assert_eq!(h.ledger.calls(Operation::ListProducts), 1);
    assert_eq!(a, b);
    assert_eq!(a.as_products().unwrap().len(), 2);
}

#[tokio::test]
async fn signed_out_gate_blocks_reads_and_writes() {
    let session = Arc::new(StaticSession::new(false));
    let gate = Arc::new(SessionGate::new(InMemoryLedger::new(), session.clone()));
    let cache = QueryCache::new(gate.clone());
    let mutations = MutationCoordinator::new(cache.clone());

    assert_eq!(
        cache.fetch_or_cached(&QueryKey::Products).await.unwrap_err(),
        RemoteError::NoSession
    );
    let err = mutations
        .create_customer(CustomerDraft {
            name: "Bilal".to_string(),
            phone: String::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Please sign in to continue");
    assert_eq!(gate.inner().total_calls(), 0);

    session.sign_in();
    assert!(gate.session_active());
    assert!(cache.fetch_or_cached(&QueryKey::Products).await.is_ok());
}
