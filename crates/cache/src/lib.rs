//! `tillbook-cache` — keyed query cache in front of the entity store.
//!
//! **Responsibility:** serve reads from memory, de-duplicate concurrent
//! fetches, and refresh entries after writes invalidate them.
//!
//! - [`QueryKey`]: collection plus parameters; parameterised keys are cached
//!   independently
//! - [`QueryCache`]: stale-while-revalidate reads, invalidation by key or by
//!   collection, subscriptions
//! - [`QuerySnapshot`]: what a subscriber sees for one key
//!
//! The cache never issues writes. Nothing is persisted across process
//! restarts; [`QueryCache::clear`] drops everything at session end.

pub mod cache;
pub mod data;
mod fetch;
pub mod key;
pub mod snapshot;

pub use cache::QueryCache;
pub use data::{FromQueryData, QueryData};
pub use key::{Collection, Invalidation, QueryKey};
pub use snapshot::{QuerySnapshot, QueryStatus, QuerySubscription};
