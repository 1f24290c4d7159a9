//! Bundle persistence seam
//!
//! Bundles are keyed by `(userId, url)`. Writing a bundle replaces whatever
//! was stored for that key; nothing is merged or versioned, and concurrent
//! writers resolve last-write-wins.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::metrics::MetricsBundle;

/// Storage key of a bundle; a record without a user id uses the empty string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleKey {
    pub user_id: String,
    pub url: String,
}

impl BundleKey {
    pub fn new(user_id: Option<&str>, url: &str) -> Self {
        Self {
            user_id: user_id.unwrap_or_default().to_string(),
            url: url.to_string(),
        }
    }

    pub fn of(bundle: &MetricsBundle) -> Self {
        Self::new(bundle.user_id.as_deref(), &bundle.url)
    }
}

pub trait BundleStore {
    /// Store `bundle`, returning the one it replaced
    fn upsert(&self, bundle: MetricsBundle) -> Option<MetricsBundle>;

    fn get(&self, key: &BundleKey) -> Option<MetricsBundle>;

    fn remove(&self, key: &BundleKey) -> Option<MetricsBundle>;
}

/// Process-local store, mainly for tests and one-shot runs
#[derive(Debug, Default)]
pub struct InMemoryBundleStore {
    bundles: RwLock<HashMap<BundleKey, MetricsBundle>>,
}

impl InMemoryBundleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bundles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BundleStore for InMemoryBundleStore {
    fn upsert(&self, bundle: MetricsBundle) -> Option<MetricsBundle> {
        let key = BundleKey::of(&bundle);
        self.bundles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, bundle)
    }

    fn get(&self, key: &BundleKey) -> Option<MetricsBundle> {
        self.bundles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn remove(&self, key: &BundleKey) -> Option<MetricsBundle> {
        self.bundles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}
