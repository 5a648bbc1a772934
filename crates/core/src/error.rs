//! Error taxonomy of the synchronization layer.
//!
//! Three families, which callers handle separately:
//! - [`ValidationError`]: caught before any remote call is issued.
//! - [`RemoteError`]: the ledger rejected a call or the transport failed.
//! - [`PartialTransactionError`]: the invoice was written, the sale was not.
//!
//! None of them is fatal; cached data is never touched on an error path.

use thiserror::Error;

use crate::invoice::Invoice;
use crate::operation::Operation;
use crate::sale::NewSale;

/// Input rejected locally, before reaching the Entity Store Client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be a number, got {input:?}")]
    NotANumber { field: &'static str, input: String },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("a customer must be selected")]
    MissingCustomer,

    #[error("an invoice needs at least one product")]
    EmptyCart,

    #[error("amount is too large")]
    AmountTooLarge,

    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("year {0} is outside the supported range")]
    InvalidYear(i32),
}

impl ValidationError {
    pub fn required(field: &'static str) -> Self {
        Self::Required { field }
    }

    pub fn not_a_number(field: &'static str, input: impl Into<String>) -> Self {
        Self::NotANumber {
            field,
            input: input.into(),
        }
    }
}

/// A remote call failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The ledger refused the call.
    #[error("{operation} rejected: {message}")]
    Rejected { operation: Operation, message: String },

    /// The referenced record does not exist (or no longer exists).
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// The transport failed before a response arrived.
    #[error("transport failure: {0}")]
    Transport(String),

    /// No identity session; the call was never issued.
    #[error("no active session")]
    NoSession,

    /// The response did not have the shape the caller asked for.
    #[error("unexpected payload for {0}")]
    UnexpectedPayload(String),
}

impl RemoteError {
    pub fn rejected(operation: Operation, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Invoice creation succeeded but recording the matching sale failed.
///
/// The invoice is the authoritative document and stays in the ledger. The
/// caller retries only `pending_sale`; it must not create the invoice again.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invoice {} was created but its sale was not recorded: {source}", .invoice.invoice_number)]
pub struct PartialTransactionError {
    pub invoice: Invoice,
    pub pending_sale: NewSale,
    pub source: RemoteError,
}

/// Umbrella error returned by the coordinator and the orchestrator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    PartialTransaction(#[from] Box<PartialTransactionError>),
}

impl From<PartialTransactionError> for SyncError {
    fn from(value: PartialTransactionError) -> Self {
        SyncError::PartialTransaction(Box::new(value))
    }
}

impl SyncError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation(_))
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, SyncError::PartialTransaction(_))
    }

    pub fn as_partial(&self) -> Option<&PartialTransactionError> {
        match self {
            SyncError::PartialTransaction(p) => Some(p),
            _ => None,
        }
    }

    /// Short text for a transient, user-visible notification.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Validation(e) => {
                let msg = e.to_string();
                let mut chars = msg.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => msg,
                }
            }
            SyncError::Remote(RemoteError::NoSession) => "Please sign in to continue".to_string(),
            SyncError::Remote(RemoteError::NotFound { entity, .. }) => {
                format!("That {entity} no longer exists")
            }
            SyncError::Remote(_) => "Something went wrong, please try again".to_string(),
            SyncError::PartialTransaction(p) => format!(
                "Invoice {} was saved but the sale was not recorded. Retry to record the sale.",
                p.invoice.invoice_number
            ),
        }
    }
}
