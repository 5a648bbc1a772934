//! Entity Store Client contract.
//!
//! **Responsibility:** one asynchronous call per remote ledger operation.
//!
//! This crate provides:
//! - [`EntityStore`]: the contract consumed by the cache, the mutation
//!   coordinator and the invoice orchestrator
//! - [`SessionGate`]: refuses to issue calls while no identity session exists
//! - [`InMemoryLedger`]: an in-process ledger for tests/dev
//!
//! Retries and timeouts belong to the transport underneath an implementation,
//! never to this layer.

pub mod in_memory;
pub mod session;
pub mod store;

pub use in_memory::{InMemoryLedger, RecordCounts};
pub use session::{SessionGate, SessionProvider, StaticSession};
pub use store::{EntityStore, StoreResult};
