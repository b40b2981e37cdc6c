//! Persistence for payment link records.
//!
//! The store is the only shared mutable resource in the registry. Backends
//! must make [`PaymentLinkStore::insert`] an atomic insert-if-absent: the
//! service's `exists` pre-check and its insert are two separate calls, so two
//! concurrent creations can both pass the pre-check with the same candidate.
//! The backend is what turns the second insert into
//! [`StoreError::DuplicateKey`].

mod file;
mod memory;

pub use file::FileLinkStore;
pub use memory::InMemoryLinkStore;

use crate::errors::StoreError;
use crate::PaymentLink;
use async_trait::async_trait;
use std::sync::Arc;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Storage trait for payment links
#[async_trait]
pub trait PaymentLinkStore: Send + Sync {
    /// Check whether a link with this short id exists.
    ///
    /// Must observe every insert this process has completed.
    async fn exists(&self, id: &str) -> StoreResult<bool>;

    /// Persist a new link, assigning its `record_id`.
    ///
    /// Returns the assigned record id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateKey` if a link with the same short id is
    /// already stored. Nothing is written in that case.
    async fn insert(&self, link: PaymentLink) -> StoreResult<String>;

    /// Fetch a link by short id.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<PaymentLink>>;

    /// All links created by `address`, newest `created_at` first.
    async fn find_by_creator_address(&self, address: &str) -> StoreResult<Vec<PaymentLink>>;

    /// Cheap connectivity probe.
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: PaymentLinkStore + ?Sized> PaymentLinkStore for Arc<T> {
    async fn exists(&self, id: &str) -> StoreResult<bool> {
        (**self).exists(id).await
    }

    async fn insert(&self, link: PaymentLink) -> StoreResult<String> {
        (**self).insert(link).await
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<PaymentLink>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_creator_address(&self, address: &str) -> StoreResult<Vec<PaymentLink>> {
        (**self).find_by_creator_address(address).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        (**self).health_check().await
    }
}

/// Sort newest first. Ties keep a stable order by short id.
pub(crate) fn sort_newest_first(links: &mut [PaymentLink]) {
    links.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
