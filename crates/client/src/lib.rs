//! `tillbook-client`
//!
//! **Responsibility:** the client-side synchronization layer of the ledger
//! app.
//!
//! This crate provides:
//! - [`MutationCoordinator`]: remote writes followed by their declared cache
//!   invalidations
//! - [`InvoiceTransactionOrchestrator`]: checkout (invoice, then sale) with a
//!   distinct partial-failure outcome
//! - [`Queries`]: typed reads through the query cache plus derived report views
//! - [`AppContext`]: everything above wired together at startup, with the
//!   user's display preferences
//!
//! The remote ledger stays the authority. Nothing is written locally except
//! display preferences.

pub mod checkout;
pub mod config;
pub mod context;
pub mod mutation;
pub mod queries;

pub use checkout::{Cart, CartLine, CheckoutReceipt, CheckoutRequest, InvoiceTransactionOrchestrator};
pub use config::ClientConfig;
pub use context::{AppContext, InMemoryPreferenceStore, PreferenceStore, Preferences, Theme};
pub use mutation::{Mutation, MutationCoordinator};
pub use queries::{DashboardView, Queries};
