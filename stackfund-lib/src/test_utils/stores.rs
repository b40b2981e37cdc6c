//! Fault-injecting stores.

use crate::errors::StoreError;
use crate::storage::{PaymentLinkStore, StoreResult};
use crate::PaymentLink;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};

/// Simulates a concurrent creator winning the check-then-insert race.
///
/// For the first `races` inserts, a competing record with the same id is
/// written to the inner store just before the real insert runs, after the
/// caller's `exists` pre-check already came back false.
pub struct RacingStore<S> {
    inner: S,
    remaining: AtomicU32,
    lost: AtomicU32,
}

impl<S: PaymentLinkStore> RacingStore<S> {
    pub fn new(inner: S, races: u32) -> Self {
        Self {
            inner,
            remaining: AtomicU32::new(races),
            lost: AtomicU32::new(0),
        }
    }

    /// Inserts that lost to the injected competitor.
    pub fn lost_races(&self) -> u32 {
        self.lost.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: PaymentLinkStore> PaymentLinkStore for RacingStore<S> {
    async fn exists(&self, id: &str) -> StoreResult<bool> {
        self.inner.exists(id).await
    }

    async fn insert(&self, link: PaymentLink) -> StoreResult<String> {
        let race = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if race {
            let mut competitor = link.clone();
            competitor.creator_address = "ST1COMPETITOR".to_string();
            competitor.title = "Concurrent creation".to_string();
            self.inner.insert(competitor).await?;
        }

        let result = self.inner.insert(link).await;
        if matches!(result, Err(StoreError::DuplicateKey(_))) {
            self.lost.fetch_add(1, Ordering::SeqCst);
        }
        result
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<PaymentLink>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_creator_address(&self, address: &str) -> StoreResult<Vec<PaymentLink>> {
        self.inner.find_by_creator_address(address).await
    }
}

/// Every operation fails as if the database were unreachable.
#[derive(Default)]
pub struct FailingStore;

fn outage() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl PaymentLinkStore for FailingStore {
    async fn exists(&self, _id: &str) -> StoreResult<bool> {
        Err(outage())
    }

    async fn insert(&self, _link: PaymentLink) -> StoreResult<String> {
        Err(outage())
    }

    async fn find_by_id(&self, _id: &str) -> StoreResult<Option<PaymentLink>> {
        Err(outage())
    }

    async fn find_by_creator_address(&self, _address: &str) -> StoreResult<Vec<PaymentLink>> {
        Err(outage())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Err(outage())
    }
}

/// Every operation hangs forever; only a caller-side timeout gets out.
#[derive(Default)]
pub struct StalledStore;

#[async_trait]
impl PaymentLinkStore for StalledStore {
    async fn exists(&self, _id: &str) -> StoreResult<bool> {
        std::future::pending().await
    }

    async fn insert(&self, _link: PaymentLink) -> StoreResult<String> {
        std::future::pending().await
    }

    async fn find_by_id(&self, _id: &str) -> StoreResult<Option<PaymentLink>> {
        std::future::pending().await
    }

    async fn find_by_creator_address(&self, _address: &str) -> StoreResult<Vec<PaymentLink>> {
        std::future::pending().await
    }

    async fn health_check(&self) -> StoreResult<()> {
        std::future::pending().await
    }
}
