//! Application context constructed once at startup.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use tillbook_cache::QueryCache;
use tillbook_store::EntityStore;

use crate::checkout::InvoiceTransactionOrchestrator;
use crate::config::ClientConfig;
use crate::mutation::MutationCoordinator;
use crate::queries::Queries;

pub const THEME_KEY: &str = "wbm-theme";
pub const AVATAR_KEY: &str = "wbm-profile-pic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Flat key/value store for display preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Process-lifetime preference store.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Theme and avatar, persisted in a [`PreferenceStore`] and observable
/// through watch channels.
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    theme: watch::Sender<Theme>,
    avatar: watch::Sender<Option<String>>,
}

impl core::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Preferences")
            .field("theme", &*self.theme.borrow())
            .field("has_avatar", &self.avatar.borrow().is_some())
            .finish()
    }
}

impl Preferences {
    /// Unknown stored theme values read as [`Theme::Light`].
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let theme = store
            .get(THEME_KEY)
            .and_then(|v| Theme::parse(&v))
            .unwrap_or_default();
        let avatar = store.get(AVATAR_KEY).filter(|v| !v.is_empty());
        Self {
            store,
            theme: watch::Sender::new(theme),
            avatar: watch::Sender::new(avatar),
        }
    }

    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.store.set(THEME_KEY, theme.as_str());
        self.theme.send_if_modified(|current| {
            if *current == theme {
                false
            } else {
                *current = theme;
                true
            }
        });
    }

    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_theme(next);
        next
    }

    pub fn watch_theme(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }

    pub fn avatar(&self) -> Option<String> {
        self.avatar.borrow().clone()
    }

    /// `None` clears the stored avatar.
    pub fn set_avatar(&self, avatar: Option<String>) {
        match &avatar {
            Some(data) => self.store.set(AVATAR_KEY, data),
            None => self.store.remove(AVATAR_KEY),
        }
        self.avatar.send_replace(avatar);
    }

    pub fn watch_avatar(&self) -> watch::Receiver<Option<String>> {
        self.avatar.subscribe()
    }
}

/// Everything the screens need, wired together at startup and passed down
/// explicitly.
pub struct AppContext<S> {
    config: ClientConfig,
    cache: QueryCache<S>,
    mutations: MutationCoordinator<S>,
    checkout: InvoiceTransactionOrchestrator<S>,
    queries: Queries<S>,
    preferences: Preferences,
}

impl<S> AppContext<S>
where
    S: EntityStore + 'static,
{
    pub fn new(store: Arc<S>, config: ClientConfig, preferences: Arc<dyn PreferenceStore>) -> Self {
        let cache = QueryCache::with_max_age(store, config.cache_max_age());
        let mutations = MutationCoordinator::new(cache.clone());
        let checkout = InvoiceTransactionOrchestrator::new(mutations.clone());
        let queries = Queries::new(cache.clone(), &config);
        tracing::info!(
            currency = %config.currency,
            utc_offset_minutes = config.utc_offset_minutes,
            "client context ready"
        );
        Self {
            config,
            cache,
            mutations,
            checkout,
            queries,
            preferences: Preferences::load(preferences),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache<S> {
        &self.cache
    }

    pub fn mutations(&self) -> &MutationCoordinator<S> {
        &self.mutations
    }

    pub fn checkout(&self) -> &InvoiceTransactionOrchestrator<S> {
        &self.checkout
    }

    pub fn queries(&self) -> &Queries<S> {
        &self.queries
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Drop every cached ledger value. Preferences are kept.
    pub fn end_session(&self) {
        self.cache.clear();
        tracing::info!("session ended");
    }
}
