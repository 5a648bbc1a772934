//! `tillbook-core` — records, identifiers and the error taxonomy shared by the
//! client synchronization layer.
//!
//! Everything here is plain data plus validation. Nothing in this crate talks
//! to the remote ledger.

pub mod customer;
pub mod entity;
pub mod error;
pub mod expense;
pub mod id;
pub mod invoice;
pub mod money;
pub mod operation;
pub mod period;
pub mod product;
pub mod sale;
pub mod settings;
pub mod stats;
pub mod time;

pub use customer::{Customer, CustomerDraft, CustomerForm, CustomerUpdate};
pub use entity::Entity;
pub use error::{PartialTransactionError, RemoteError, SyncError, ValidationError};
pub use expense::{DEFAULT_EXPENSE_CATEGORY, Expense, ExpenseDraft, ExpenseForm};
pub use id::{CustomerId, ExpenseId, InvoiceId, ProductId, SaleId};
pub use invoice::{Invoice, InvoiceItem, NewInvoice, invoice_total};
pub use money::{Amount, parse_amount, parse_quantity, sum_amounts};
pub use operation::Operation;
pub use period::ReportMonth;
pub use product::{LOW_STOCK_THRESHOLD, Product, ProductDraft, ProductForm};
pub use sale::{NewSale, Sale};
pub use settings::{Settings, UserProfile};
pub use stats::{DashboardStats, ProfitLoss};
pub use time::Timestamp;
