use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Offset, Utc};
use rust_decimal::Decimal;

use tillbook_core::{
    Amount, Customer, CustomerDraft, CustomerId, CustomerUpdate, DashboardStats, Entity, Expense,
    ExpenseDraft, ExpenseId, Invoice, InvoiceId, NewInvoice, NewSale, Operation, Product,
    ProductDraft, ProductId, ProfitLoss, RemoteError, ReportMonth, Sale, SaleId, Settings,
    Timestamp, UserProfile, sum_amounts,
};

use crate::store::{EntityStore, StoreResult};

#[derive(Debug, Default)]
struct Counters {
    product: u64,
    customer: u64,
    invoice: u64,
    expense: u64,
    sale: u64,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct Tables {
    counters: Counters,
    products: BTreeMap<ProductId, Product>,
    customers: BTreeMap<CustomerId, Customer>,
    invoices: BTreeMap<InvoiceId, Invoice>,
    expenses: BTreeMap<ExpenseId, Expense>,
    sales: BTreeMap<SaleId, Sale>,
    settings: Settings,
    profile: Option<UserProfile>,
}

#[derive(Debug, Default)]
struct Faults {
    once: HashMap<Operation, VecDeque<RemoteError>>,
    always: HashMap<Operation, RemoteError>,
}

impl Faults {
    fn take(&mut self, operation: Operation) -> Option<RemoteError> {
        if let Some(queue) = self.once.get_mut(&operation) {
            if let Some(err) = queue.pop_front() {
                return Some(err);
            }
        }
        self.always.get(&operation).cloned()
    }
}

/// Record counts, read without going through (and counting) a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordCounts {
    pub products: usize,
    pub customers: usize,
    pub invoices: usize,
    pub expenses: usize,
    pub sales: usize,
}

/// In-process authoritative ledger.
///
/// Intended for tests/dev. Day and month boundaries of the aggregate reads are
/// evaluated in UTC, like the hosted ledger.
///
/// Besides the [`EntityStore`] contract it offers test tooling: per-operation
/// call counters, injected failures, simulated latency and a fixed clock.
#[derive(Debug)]
pub struct InMemoryLedger {
    tables: RwLock<Tables>,
    calls: Mutex<HashMap<Operation, u64>>,
    faults: Mutex<Faults>,
    latency: Mutex<Option<Duration>>,
    clock: Mutex<Option<Timestamp>>,
    session: AtomicBool,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self {
            tables: RwLock::default(),
            calls: Mutex::default(),
            faults: Mutex::default(),
            latency: Mutex::default(),
            clock: Mutex::default(),
            session: AtomicBool::new(true),
        }
    }
}

fn poisoned() -> RemoteError {
    RemoteError::Transport("ledger lock poisoned".to_string())
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls issued for `operation` so far.
    pub fn calls(&self, operation: Operation) -> u64 {
        self.calls
            .lock()
            .map(|c| c.get(&operation).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> u64 {
        self.calls.lock().map(|c| c.values().sum()).unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    /// Fail the next call of `operation` with `err`. Queued failures are
    /// consumed in order.
    pub fn fail_next(&self, operation: Operation, err: RemoteError) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.once.entry(operation).or_default().push_back(err);
        }
    }

    /// Fail every call of `operation` until [`clear_failures`](Self::clear_failures).
    pub fn fail_always(&self, operation: Operation, err: RemoteError) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.always.insert(operation, err);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut faults) = self.faults.lock() {
            *faults = Faults::default();
        }
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut slot) = self.latency.lock() {
            *slot = latency;
        }
    }

    /// Pin the ledger clock. `None` goes back to wall-clock time.
    pub fn set_now(&self, now: Option<Timestamp>) {
        if let Ok(mut slot) = self.clock.lock() {
            *slot = now;
        }
    }

    pub fn set_session(&self, active: bool) {
        self.session.store(active, Ordering::SeqCst);
    }

    pub fn record_counts(&self) -> RecordCounts {
        self.tables
            .read()
            .map(|t| RecordCounts {
                products: t.products.len(),
                customers: t.customers.len(),
                invoices: t.invoices.len(),
                expenses: t.expenses.len(),
                sales: t.sales.len(),
            })
            .unwrap_or_default()
    }

    fn now(&self) -> Timestamp {
        self.clock
            .lock()
            .ok()
            .and_then(|c| *c)
            .unwrap_or_else(Timestamp::now)
    }

    /// Entry point of every call: counts it, applies latency, then the
    /// session check and any injected failure.
    async fn begin(&self, operation: Operation) -> StoreResult<()> {
        *self.calls.lock().map_err(|_| poisoned())?.entry(operation).or_insert(0) += 1;

        let latency = *self.latency.lock().map_err(|_| poisoned())?;
        match latency {
            Some(d) => tokio::time::sleep(d).await,
            None => tokio::task::yield_now().await,
        }

        if !self.session.load(Ordering::SeqCst) {
            return Err(RemoteError::NoSession);
        }
        let injected = self.faults.lock().map_err(|_| poisoned())?.take(operation);
        if let Some(err) = injected {
            tracing::debug!(operation = %operation, error = %err, "injected failure");
            return Err(err);
        }
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> StoreResult<T>) -> StoreResult<T> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        f(&tables)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> StoreResult<T>) -> StoreResult<T> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        f(&mut tables)
    }
}

fn sales_between(tables: &Tables, start: Timestamp, end: Timestamp) -> Amount {
    sum_amounts(
        tables
            .sales
            .values()
            .filter(|s| s.date >= start && s.date <= end)
            .map(|s| s.amount),
    )
}

fn product_from(id: ProductId, draft: &ProductDraft, created_at: Timestamp) -> Product {
    Product {
        id,
        name: draft.name.clone(),
        price: draft.price,
        quantity: draft.quantity,
        image_url: draft.image_url.clone(),
        category: draft.category.clone(),
        description: draft.description.clone(),
        unit: draft.unit.clone(),
        barcode: draft.barcode.clone(),
        created_at,
    }
}

#[async_trait]
impl EntityStore for InMemoryLedger {
    fn session_active(&self) -> bool {
        self.session.load(Ordering::SeqCst)
    }

    async fn create_product(&self, draft: &ProductDraft) -> StoreResult<Product> {
        self.begin(Operation::CreateProduct).await?;
        let now = self.now();
        self.write(|t| {
            let id = ProductId::new(next(&mut t.counters.product));
            let product = product_from(id, draft, now);
            t.products.insert(id, product.clone());
            Ok(product)
        })
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Product> {
        self.begin(Operation::GetProduct).await?;
        self.read(|t| {
            t.products
                .get(&id)
                .cloned()
                .ok_or_else(|| RemoteError::not_found(Product::NAME, id))
        })
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.begin(Operation::ListProducts).await?;
        self.read(|t| Ok(t.products.values().cloned().collect()))
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> StoreResult<Product> {
        self.begin(Operation::UpdateProduct).await?;
        self.write(|t| {
            let slot = t
                .products
                .get_mut(&id)
                .ok_or_else(|| RemoteError::not_found(Product::NAME, id))?;
            *slot = product_from(id, draft, slot.created_at);
            Ok(slot.clone())
        })
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        self.begin(Operation::DeleteProduct).await?;
        self.write(|t| {
            t.products
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| RemoteError::not_found(Product::NAME, id))
        })
    }

    async fn create_customer(&self, draft: &CustomerDraft) -> StoreResult<Customer> {
        self.begin(Operation::CreateCustomer).await?;
        let now = self.now();
        self.write(|t| {
            let id = CustomerId::new(next(&mut t.counters.customer));
            let customer = Customer {
                id,
                name: draft.name.clone(),
                phone: draft.phone.clone(),
                due_amount: Decimal::ZERO,
                created_at: now,
            };
            t.customers.insert(id, customer.clone());
            Ok(customer)
        })
    }

    async fn get_customer(&self, id: CustomerId) -> StoreResult<Customer> {
        self.begin(Operation::GetCustomer).await?;
        self.read(|t| {
            t.customers
                .get(&id)
                .cloned()
                .ok_or_else(|| RemoteError::not_found(Customer::NAME, id))
        })
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        self.begin(Operation::ListCustomers).await?;
        self.read(|t| Ok(t.customers.values().cloned().collect()))
    }

    async fn update_customer(&self, id: CustomerId, update: &CustomerUpdate) -> StoreResult<Customer> {
        self.begin(Operation::UpdateCustomer).await?;
        self.write(|t| {
            let slot = t
                .customers
                .get_mut(&id)
                .ok_or_else(|| RemoteError::not_found(Customer::NAME, id))?;
            slot.name = update.name.clone();
            slot.phone = update.phone.clone();
            slot.due_amount = update.due_amount;
            Ok(slot.clone())
        })
    }

    async fn delete_customer(&self, id: CustomerId) -> StoreResult<()> {
        self.begin(Operation::DeleteCustomer).await?;
        // Invoices and sales keep their customer id; nothing cascades.
        self.write(|t| {
            t.customers
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| RemoteError::not_found(Customer::NAME, id))
        })
    }

    async fn create_invoice(&self, invoice: &NewInvoice) -> StoreResult<Invoice> {
        self.begin(Operation::CreateInvoice).await?;
        let now = self.now();
        self.write(|t| {
            if !t.customers.contains_key(&invoice.customer_id) {
                return Err(RemoteError::not_found(Customer::NAME, invoice.customer_id));
            }
            let raw = next(&mut t.counters.invoice);
            let id = InvoiceId::new(raw);
            let created = Invoice {
                id,
                invoice_number: format!("INV-{raw:04}"),
                customer_id: invoice.customer_id,
                items: invoice.items.clone(),
                total: invoice.total,
                notes: invoice.notes.clone(),
                date: now,
            };
            t.invoices.insert(id, created.clone());
            Ok(created)
        })
    }

    async fn get_invoice(&self, id: InvoiceId) -> StoreResult<Invoice> {
        self.begin(Operation::GetInvoice).await?;
        self.read(|t| {
            t.invoices
                .get(&id)
                .cloned()
                .ok_or_else(|| RemoteError::not_found(Invoice::NAME, id))
        })
    }

    async fn list_invoices(&self) -> StoreResult<Vec<Invoice>> {
        self.begin(Operation::ListInvoices).await?;
        self.read(|t| Ok(t.invoices.values().cloned().collect()))
    }

    async fn create_expense(&self, draft: &ExpenseDraft) -> StoreResult<Expense> {
        self.begin(Operation::CreateExpense).await?;
        let now = self.now();
        self.write(|t| {
            let id = ExpenseId::new(next(&mut t.counters.expense));
            let expense = Expense {
                id,
                amount: draft.amount,
                category: draft.category.clone(),
                description: draft.description.clone(),
                date: now,
            };
            t.expenses.insert(id, expense.clone());
            Ok(expense)
        })
    }

    async fn list_expenses(&self) -> StoreResult<Vec<Expense>> {
        self.begin(Operation::ListExpenses).await?;
        self.read(|t| Ok(t.expenses.values().cloned().collect()))
    }

    async fn update_expense(&self, id: ExpenseId, draft: &ExpenseDraft) -> StoreResult<Expense> {
        self.begin(Operation::UpdateExpense).await?;
        self.write(|t| {
            let slot = t
                .expenses
                .get_mut(&id)
                .ok_or_else(|| RemoteError::not_found(Expense::NAME, id))?;
            slot.amount = draft.amount;
            slot.category = draft.category.clone();
            slot.description = draft.description.clone();
            Ok(slot.clone())
        })
    }

    async fn delete_expense(&self, id: ExpenseId) -> StoreResult<()> {
        self.begin(Operation::DeleteExpense).await?;
        self.write(|t| {
            t.expenses
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| RemoteError::not_found(Expense::NAME, id))
        })
    }

    async fn create_sale(&self, sale: &NewSale) -> StoreResult<Sale> {
        self.begin(Operation::CreateSale).await?;
        let now = self.now();
        self.write(|t| {
            if !t.invoices.contains_key(&sale.invoice_id) {
                return Err(RemoteError::not_found(Invoice::NAME, sale.invoice_id));
            }
            if !t.customers.contains_key(&sale.customer_id) {
                return Err(RemoteError::not_found(Customer::NAME, sale.customer_id));
            }
            let id = SaleId::new(next(&mut t.counters.sale));
            let created = Sale {
                id,
                invoice_id: sale.invoice_id,
                customer_id: sale.customer_id,
                amount: sale.amount,
                date: now,
            };
            t.sales.insert(id, created.clone());
            Ok(created)
        })
    }

    async fn list_sales(&self) -> StoreResult<Vec<Sale>> {
        self.begin(Operation::ListSales).await?;
        self.read(|t| Ok(t.sales.values().cloned().collect()))
    }

    async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        self.begin(Operation::DashboardStats).await?;
        let today = self.now().to_datetime().date_naive();
        self.read(|t| {
            let today_revenue = sum_amounts(
                t.sales
                    .values()
                    .filter(|s| s.date.to_datetime().date_naive() == today)
                    .map(|s| s.amount),
            );
            Ok(DashboardStats {
                total_products: t.products.len() as u64,
                total_sales_amount: sum_amounts(t.sales.values().map(|s| s.amount)),
                today_revenue,
                total_customers: t.customers.len() as u64,
            })
        })
    }

    async fn profit_loss(&self, month: ReportMonth) -> StoreResult<ProfitLoss> {
        self.begin(Operation::ProfitLoss).await?;
        let (start, end) = month.bounds(Utc.fix());
        self.read(|t| {
            let expenses = sum_amounts(
                t.expenses
                    .values()
                    .filter(|e| e.date >= start && e.date <= end)
                    .map(|e| e.amount),
            );
            Ok(ProfitLoss::new(sales_between(t, start, end), expenses))
        })
    }

    async fn low_stock_products(&self) -> StoreResult<Vec<Product>> {
        self.begin(Operation::LowStockProducts).await?;
        self.read(|t| Ok(t.products.values().filter(|p| p.is_low_stock()).cloned().collect()))
    }

    async fn expenses_by_category(&self, category: &str) -> StoreResult<Vec<Expense>> {
        self.begin(Operation::ExpensesByCategory).await?;
        self.read(|t| {
            Ok(t.expenses
                .values()
                .filter(|e| e.category == category)
                .cloned()
                .collect())
        })
    }

    async fn expenses_by_month(&self, month: ReportMonth) -> StoreResult<Vec<Expense>> {
        self.begin(Operation::ExpensesByMonth).await?;
        self.read(|t| {
            Ok(t.expenses
                .values()
                .filter(|e| {
                    let dt = e.date.to_datetime();
                    dt.year() == month.year() && dt.month() == month.month()
                })
                .cloned()
                .collect())
        })
    }

    async fn total_sales(&self, start: Timestamp, end: Timestamp) -> StoreResult<Amount> {
        self.begin(Operation::TotalSales).await?;
        self.read(|t| Ok(sales_between(t, start, end)))
    }

    async fn get_settings(&self) -> StoreResult<Settings> {
        self.begin(Operation::GetSettings).await?;
        self.read(|t| Ok(t.settings.clone()))
    }

    async fn update_settings(&self, settings: &Settings) -> StoreResult<()> {
        self.begin(Operation::UpdateSettings).await?;
        self.write(|t| {
            t.settings = settings.clone();
            Ok(())
        })
    }

    async fn caller_profile(&self) -> StoreResult<Option<UserProfile>> {
        self.begin(Operation::GetCallerProfile).await?;
        self.read(|t| Ok(t.profile.clone()))
    }

    async fn save_caller_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.begin(Operation::SaveCallerProfile).await?;
        self.write(|t| {
            t.profile = Some(profile.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tillbook_core::InvoiceItem;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Timestamp::from(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    fn draft(name: &str, price: i64, quantity: u64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            price: Decimal::from(price),
            quantity,
            ..ProductDraft::default()
        }
    }

    fn expense(amount: i64, category: &str) -> ExpenseDraft {
        ExpenseDraft {
            amount: Decimal::from(amount),
            category: category.to_string(),
            description: String::new(),
        }
    }

    async fn customer(ledger: &InMemoryLedger, name: &str) -> Customer {
        ledger
            .create_customer(&CustomerDraft {
                name: name.to_string(),
                phone: String::new(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn invoice_numbers_are_sequential_and_padded() {
        let ledger = InMemoryLedger::new();
        let c = customer(&ledger, "Ayesha").await;
        let first = ledger
            .create_invoice(&NewInvoice::from_items(c.id, vec![], "").unwrap())
            .await
            .unwrap();
        let second = ledger
            .create_invoice(&NewInvoice::from_items(c.id, vec![], "").unwrap())
            .await
            .unwrap();
        assert_eq!(first.invoice_number, "INV-0001");
        assert_eq!(second.invoice_number, "INV-0002");
    }

    #[tokio::test]
    async fn invoice_for_unknown_customer_is_not_found() {
        let ledger = InMemoryLedger::new();
        let err = ledger
            .create_invoice(&NewInvoice::from_items(CustomerId::new(42), vec![], "").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, RemoteError::not_found("customer", CustomerId::new(42)));
        assert_eq!(ledger.record_counts().invoices, 0);
    }

    #[tokio::test]
    async fn invoicing_never_touches_due_amount() {
        let ledger = InMemoryLedger::new();
        let c = customer(&ledger, "Bilal").await;
        let items = vec![InvoiceItem {
            product_id: ProductId::new(1),
            product_name: "Tea".to_string(),
            qty: 2,
            unit_price: Decimal::from(100),
        }];
        let invoice = ledger
            .create_invoice(&NewInvoice::from_items(c.id, items, "").unwrap())
            .await
            .unwrap();
        ledger
            .create_sale(&NewSale {
                customer_id: c.id,
                invoice_id: invoice.id,
                amount: invoice.total,
            })
            .await
            .unwrap();
        assert_eq!(ledger.get_customer(c.id).await.unwrap().due_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn injected_failures_are_one_shot_or_persistent() {
        let ledger = InMemoryLedger::new();
        ledger.fail_next(Operation::ListProducts, RemoteError::Transport("reset".into()));
        assert!(ledger.list_products().await.is_err());
        assert!(ledger.list_products().await.is_ok());

        ledger.fail_always(Operation::ListProducts, RemoteError::Transport("down".into()));
        assert!(ledger.list_products().await.is_err());
        assert!(ledger.list_products().await.is_err());
        ledger.clear_failures();
        assert!(ledger.list_products().await.is_ok());
        assert_eq!(ledger.calls(Operation::ListProducts), 5);
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_records_fail() {
        let ledger = InMemoryLedger::new();
        assert!(matches!(
            ledger.update_product(ProductId::new(3), &draft("Soap", 10, 1)).await,
            Err(RemoteError::NotFound { entity: "product", id: 3 })
        ));
        assert!(matches!(
            ledger.delete_expense(ExpenseId::new(8)).await,
            Err(RemoteError::NotFound { entity: "expense", id: 8 })
        ));
    }

    #[tokio::test]
    async fn low_stock_is_below_five_units() {
        let ledger = InMemoryLedger::new();
        ledger.create_product(&draft("Rice", 100, 4)).await.unwrap();
        ledger.create_product(&draft("Sugar", 90, 5)).await.unwrap();
        let low = ledger.low_stock_products().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Rice");
    }

    #[tokio::test]
    async fn aggregates_use_utc_boundaries() {
        let ledger = InMemoryLedger::new();
        let c = customer(&ledger, "Sana").await;

        ledger.set_now(Some(at(2025, 2, 28, 23)));
        let feb = ledger
            .create_invoice(&NewInvoice::from_items(c.id, vec![], "").unwrap())
            .await
            .unwrap();
        ledger
            .create_sale(&NewSale {
                customer_id: c.id,
                invoice_id: feb.id,
                amount: Decimal::from(500),
            })
            .await
            .unwrap();
        ledger.create_expense(&expense(200, "Rent")).await.unwrap();

        ledger.set_now(Some(at(2025, 3, 1, 1)));
        ledger
            .create_sale(&NewSale {
                customer_id: c.id,
                invoice_id: feb.id,
                amount: Decimal::from(300),
            })
            .await
            .unwrap();

        let february = ReportMonth::new(2025, 2).unwrap();
        let pl = ledger.profit_loss(february).await.unwrap();
        assert_eq!(pl, ProfitLoss::new(Decimal::from(500), Decimal::from(200)));
        assert_eq!(ledger.expenses_by_month(february).await.unwrap().len(), 1);

        let stats = ledger.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_sales_amount, Decimal::from(800));
        assert_eq!(stats.today_revenue, Decimal::from(300));
        assert_eq!(stats.total_customers, 1);

        let total = ledger
            .total_sales(at(2025, 2, 1, 0), at(2025, 2, 28, 23))
            .await
            .unwrap();
        assert_eq!(total, Decimal::from(500));
    }

    #[tokio::test]
    async fn expenses_by_category_match_exactly() {
        let ledger = InMemoryLedger::new();
        ledger.create_expense(&expense(10, "Rent")).await.unwrap();
        ledger.create_expense(&expense(20, "rent")).await.unwrap();
        assert_eq!(ledger.expenses_by_category("Rent").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn settings_default_and_profile_absent() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.get_settings().await.unwrap(), Settings::default());
        assert_eq!(ledger.caller_profile().await.unwrap(), None);
        let profile = UserProfile {
            name: "Sana".to_string(),
        };
        ledger.save_caller_profile(&profile).await.unwrap();
        assert_eq!(ledger.caller_profile().await.unwrap(), Some(profile));
    }
}
