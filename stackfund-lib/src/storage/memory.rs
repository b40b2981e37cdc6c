//! In-memory payment link store.
//!
//! Suitable for tests and single-process development servers. Records are
//! lost when the process exits.
//!
//! # Thread Safety
//!
//! All state sits behind one `RwLock`, so the duplicate check and the write
//! in [`insert`](PaymentLinkStore::insert) happen under the same write guard.
//! Lock poisoning is reported as `StoreError::Unavailable` rather than a
//! panic.

use super::{new_record_id, sort_newest_first, PaymentLinkStore, StoreResult};
use crate::errors::StoreError;
use crate::PaymentLink;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct Inner {
    links: HashMap<String, PaymentLink>,
    // creator address -> short ids
    by_creator: HashMap<String, Vec<String>>,
}

/// In-memory implementation of [`PaymentLinkStore`].
#[derive(Default)]
pub struct InMemoryLinkStore {
    inner: RwLock<Inner>,
}

fn lock_error(context: &str) -> StoreError {
    StoreError::Unavailable(format!(
        "InMemoryLinkStore: lock poisoned during {}",
        context
    ))
}

impl InMemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links. Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.links.len()).unwrap_or(0)
    }

    /// True when no links are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PaymentLinkStore for InMemoryLinkStore {
    async fn exists(&self, id: &str) -> StoreResult<bool> {
        let inner = self.inner.read().map_err(|_| lock_error("exists"))?;
        Ok(inner.links.contains_key(id))
    }

    async fn insert(&self, mut link: PaymentLink) -> StoreResult<String> {
        let mut inner = self.inner.write().map_err(|_| lock_error("insert"))?;

        if inner.links.contains_key(&link.id) {
            return Err(StoreError::DuplicateKey(link.id));
        }

        let record_id = new_record_id();
        link.record_id = record_id.clone();
        inner
            .by_creator
            .entry(link.creator_address.clone())
            .or_default()
            .push(link.id.clone());
        inner.links.insert(link.id.clone(), link);

        Ok(record_id)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<PaymentLink>> {
        let inner = self.inner.read().map_err(|_| lock_error("find_by_id"))?;
        Ok(inner.links.get(id).cloned())
    }

    async fn find_by_creator_address(&self, address: &str) -> StoreResult<Vec<PaymentLink>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| lock_error("find_by_creator_address"))?;

        let mut links: Vec<PaymentLink> = inner
            .by_creator
            .get(address)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.links.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        drop(inner);

        sort_newest_first(&mut links);
        Ok(links)
    }
}
