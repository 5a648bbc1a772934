//! Observable per-key state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use tillbook_core::RemoteError;

use crate::data::QueryData;
use crate::key::QueryKey;

/// Fetch state of one key.
///
/// `Loading` and `Error` keep the last good value visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Idle => "idle",
            QueryStatus::Loading => "loading",
            QueryStatus::Success => "success",
            QueryStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot {
    pub key: QueryKey,
    pub status: QueryStatus,
    pub data: Option<Arc<QueryData>>,
    pub error: Option<RemoteError>,
    pub is_stale: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl QuerySnapshot {
    pub(crate) fn idle(key: QueryKey) -> Self {
        Self {
            key,
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_stale: false,
            updated_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }
}

/// Stream of snapshots for one key.
///
/// The first message is the state at subscription time. Dropping the
/// subscription unregisters it; the cache prunes it on its next publish.
/// The stream ends when the key is removed or the cache is cleared.
#[derive(Debug)]
pub struct QuerySubscription {
    key: QueryKey,
    receiver: mpsc::UnboundedReceiver<QuerySnapshot>,
}

impl QuerySubscription {
    pub(crate) fn new(key: QueryKey, receiver: mpsc::UnboundedReceiver<QuerySnapshot>) -> Self {
        Self { key, receiver }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Wait for the next snapshot. `None` once the cache dropped the key.
    pub async fn recv(&mut self) -> Option<QuerySnapshot> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<QuerySnapshot> {
        self.receiver.try_recv().ok()
    }
}
