//! Entity Store Client contract.

use async_trait::async_trait;

use tillbook_core::{
    Amount, Customer, CustomerDraft, CustomerId, CustomerUpdate, DashboardStats, Expense,
    ExpenseDraft, ExpenseId, Invoice, InvoiceId, NewInvoice, NewSale, Product, ProductDraft,
    ProductId, ProfitLoss, RemoteError, ReportMonth, Sale, Settings, Timestamp, UserProfile,
};

pub type StoreResult<T> = Result<T, RemoteError>;

/// Asynchronous façade over the remote ledger.
///
/// Every method issues exactly one remote call and resolves with the
/// ledger's answer or a [`RemoteError`]. Implementations must not retry,
/// cache, or reorder calls; the layers above rely on "one method call, one
/// remote call" when they count and de-duplicate requests.
///
/// Identifiers in arguments and results are opaque ledger-assigned values.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Whether calls may be issued at all (an identity session exists).
    fn session_active(&self) -> bool {
        true
    }

    // Products
    async fn create_product(&self, draft: &ProductDraft) -> StoreResult<Product>;
    async fn get_product(&self, id: ProductId) -> StoreResult<Product>;
    async fn list_products(&self) -> StoreResult<Vec<Product>>;
    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> StoreResult<Product>;
    async fn delete_product(&self, id: ProductId) -> StoreResult<()>;

    // Customers
    async fn create_customer(&self, draft: &CustomerDraft) -> StoreResult<Customer>;
    async fn get_customer(&self, id: CustomerId) -> StoreResult<Customer>;
    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;
    async fn update_customer(&self, id: CustomerId, update: &CustomerUpdate) -> StoreResult<Customer>;
    async fn delete_customer(&self, id: CustomerId) -> StoreResult<()>;

    // Invoices
    async fn create_invoice(&self, invoice: &NewInvoice) -> StoreResult<Invoice>;
    async fn get_invoice(&self, id: InvoiceId) -> StoreResult<Invoice>;
    async fn list_invoices(&self) -> StoreResult<Vec<Invoice>>;

    // Expenses
    async fn create_expense(&self, draft: &ExpenseDraft) -> StoreResult<Expense>;
    async fn list_expenses(&self) -> StoreResult<Vec<Expense>>;
    async fn update_expense(&self, id: ExpenseId, draft: &ExpenseDraft) -> StoreResult<Expense>;
    async fn delete_expense(&self, id: ExpenseId) -> StoreResult<()>;

    // Sales
    async fn create_sale(&self, sale: &NewSale) -> StoreResult<Sale>;
    async fn list_sales(&self) -> StoreResult<Vec<Sale>>;

    // Aggregate reads
    async fn dashboard_stats(&self) -> StoreResult<DashboardStats>;
    async fn profit_loss(&self, month: ReportMonth) -> StoreResult<ProfitLoss>;
    async fn low_stock_products(&self) -> StoreResult<Vec<Product>>;
    async fn expenses_by_category(&self, category: &str) -> StoreResult<Vec<Expense>>;
    async fn expenses_by_month(&self, month: ReportMonth) -> StoreResult<Vec<Expense>>;
    async fn total_sales(&self, start: Timestamp, end: Timestamp) -> StoreResult<Amount>;

    // Settings / profile
    async fn get_settings(&self) -> StoreResult<Settings>;
    async fn update_settings(&self, settings: &Settings) -> StoreResult<()>;
    async fn caller_profile(&self) -> StoreResult<Option<UserProfile>>;
    async fn save_caller_profile(&self, profile: &UserProfile) -> StoreResult<()>;
}
