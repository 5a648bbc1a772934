//! Identity session gating.
//!
//! Establishing a session (login) is outside this crate. All the core needs
//! to know is whether one exists: without a session no remote call is issued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use tillbook_core::{
    Amount, Customer, CustomerDraft, CustomerId, CustomerUpdate, DashboardStats, Expense,
    ExpenseDraft, ExpenseId, Invoice, InvoiceId, NewInvoice, NewSale, Operation, Product,
    ProductDraft, ProductId, ProfitLoss, RemoteError, ReportMonth, Sale, Settings, Timestamp,
    UserProfile,
};

use crate::store::{EntityStore, StoreResult};

/// Source of truth for "is someone signed in".
pub trait SessionProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

impl<P> SessionProvider for Arc<P>
where
    P: SessionProvider + ?Sized,
{
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }
}

/// Session flag toggled by the identity flow (or by tests).
#[derive(Debug, Default)]
pub struct StaticSession {
    active: AtomicBool,
}

impl StaticSession {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
        }
    }

    pub fn sign_in(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn sign_out(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl SessionProvider for StaticSession {
    fn is_authenticated(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Wraps a store so that calls are only forwarded while a session exists.
///
/// Without a session every call fails with [`RemoteError::NoSession`] and the
/// inner store never sees it.
#[derive(Debug)]
pub struct SessionGate<S, P> {
    inner: S,
    session: P,
}

impl<S, P> SessionGate<S, P> {
    pub fn new(inner: S, session: P) -> Self {
        Self { inner, session }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S, P> SessionGate<S, P>
where
    P: SessionProvider,
{
    fn guard(&self, operation: Operation) -> StoreResult<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            tracing::debug!(operation = %operation, "no session; call not issued");
            Err(RemoteError::NoSession)
        }
    }
}

#[async_trait]
impl<S, P> EntityStore for SessionGate<S, P>
where
    S: EntityStore,
    P: SessionProvider,
{
    fn session_active(&self) -> bool {
        self.session.is_authenticated() && self.inner.session_active()
    }

    async fn create_product(&self, draft: &ProductDraft) -> StoreResult<Product> {
        self.guard(Operation::CreateProduct)?;
        self.inner.create_product(draft).await
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Product> {
        self.guard(Operation::GetProduct)?;
        self.inner.get_product(id).await
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        self.guard(Operation::ListProducts)?;
        self.inner.list_products().await
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> StoreResult<Product> {
        self.guard(Operation::UpdateProduct)?;
        self.inner.update_product(id, draft).await
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<()> {
        self.guard(Operation::DeleteProduct)?;
        self.inner.delete_product(id).await
    }

    async fn create_customer(&self, draft: &CustomerDraft) -> StoreResult<Customer> {
        self.guard(Operation::CreateCustomer)?;
        self.inner.create_customer(draft).await
    }

    async fn get_customer(&self, id: CustomerId) -> StoreResult<Customer> {
        self.guard(Operation::GetCustomer)?;
        self.inner.get_customer(id).await
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        self.guard(Operation::ListCustomers)?;
        self.inner.list_customers().await
    }

    async fn update_customer(&self, id: CustomerId, update: &CustomerUpdate) -> StoreResult<Customer> {
        self.guard(Operation::UpdateCustomer)?;
        self.inner.update_customer(id, update).await
    }

    async fn delete_customer(&self, id: CustomerId) -> StoreResult<()> {
        self.guard(Operation::DeleteCustomer)?;
        self.inner.delete_customer(id).await
    }

    async fn create_invoice(&self, invoice: &NewInvoice) -> StoreResult<Invoice> {
        self.guard(Operation::CreateInvoice)?;
        self.inner.create_invoice(invoice).await
    }

    async fn get_invoice(&self, id: InvoiceId) -> StoreResult<Invoice> {
        self.guard(Operation::GetInvoice)?;
        self.inner.get_invoice(id).await
    }

    async fn list_invoices(&self) -> StoreResult<Vec<Invoice>> {
        self.guard(Operation::ListInvoices)?;
        self.inner.list_invoices().await
    }

    async fn create_expense(&self, draft: &ExpenseDraft) -> StoreResult<Expense> {
        self.guard(Operation::CreateExpense)?;
        self.inner.create_expense(draft).await
    }

    async fn list_expenses(&self) -> StoreResult<Vec<Expense>> {
        self.guard(Operation::ListExpenses)?;
        self.inner.list_expenses().await
    }

    async fn update_expense(&self, id: ExpenseId, draft: &ExpenseDraft) -> StoreResult<Expense> {
        self.guard(Operation::UpdateExpense)?;
        self.inner.update_expense(id, draft).await
    }

    async fn delete_expense(&self, id: ExpenseId) -> StoreResult<()> {
        self.guard(Operation::DeleteExpense)?;
        self.inner.delete_expense(id).await
    }

    async fn create_sale(&self, sale: &NewSale) -> StoreResult<Sale> {
        self.guard(Operation::CreateSale)?;
        self.inner.create_sale(sale).await
    }

    async fn list_sales(&self) -> StoreResult<Vec<Sale>> {
        self.guard(Operation::ListSales)?;
        self.inner.list_sales().await
    }

    async fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        self.guard(Operation::DashboardStats)?;
        self.inner.dashboard_stats().await
    }

    async fn profit_loss(&self, month: ReportMonth) -> StoreResult<ProfitLoss> {
        self.guard(Operation::ProfitLoss)?;
        self.inner.profit_loss(month).await
    }

    async fn low_stock_products(&self) -> StoreResult<Vec<Product>> {
        self.guard(Operation::LowStockProducts)?;
        self.inner.low_stock_products().await
    }

    async fn expenses_by_category(&self, category: &str) -> StoreResult<Vec<Expense>> {
        self.guard(Operation::ExpensesByCategory)?;
        self.inner.expenses_by_category(category).await
    }

    async fn expenses_by_month(&self, month: ReportMonth) -> StoreResult<Vec<Expense>> {
        self.guard(Operation::ExpensesByMonth)?;
        self.inner.expenses_by_month(month).await
    }

    async fn total_sales(&self, start: Timestamp, end: Timestamp) -> StoreResult<Amount> {
        self.guard(Operation::TotalSales)?;
        self.inner.total_sales(start, end).await
    }

    async fn get_settings(&self) -> StoreResult<Settings> {
        self.guard(Operation::GetSettings)?;
        self.inner.get_settings().await
    }

    async fn update_settings(&self, settings: &Settings) -> StoreResult<()> {
        self.guard(Operation::UpdateSettings)?;
        self.inner.update_settings(settings).await
    }

    async fn caller_profile(&self) -> StoreResult<Option<UserProfile>> {
        self.guard(Operation::GetCallerProfile)?;
        self.inner.caller_profile().await
    }

    async fn save_caller_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.guard(Operation::SaveCallerProfile)?;
        self.inner.save_caller_profile(profile).await
    }
}
