//! The payment link service: the only writer of payment link records.
//!
//! # Id allocation
//!
//! Creation draws a candidate from the [`LinkIdGenerator`], asks the store
//! whether it is taken, and inserts. A collision at either step (the
//! `exists` pre-check, or `StoreError::DuplicateKey` from an insert that lost
//! a race) sends the loop back for a fresh candidate. The loop is bounded by
//! [`ServiceConfig::max_id_attempts`].
//!
//! Every store call runs under [`ServiceConfig::store_timeout`]; an elapsed
//! deadline is reported as [`LinkError::StorageUnavailable`].

use crate::config::ServiceConfig;
use crate::errors::{LinkError, StoreError};
use crate::id::{LinkIdGenerator, RandomIdGenerator};
use crate::storage::{PaymentLinkStore, StoreResult};
use crate::{Amount, LinkStatus, PaymentLink, PaymentLinkView, Result};
use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use tracing::{debug, info, warn};

/// Input to [`PaymentLinkService::create`].
///
/// Required fields are optional here so the service can report which one is
/// missing. `amount` holds the caller's textual form (`"0.5"`, `"12"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPaymentLink {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
    /// Lifetime in days; absent or non-positive means the configured default.
    pub duration: Option<i64>,
    pub payment_token: Option<String>,
    pub creator_address: Option<String>,
    pub creator_id: Option<String>,
    /// Overrides the creation timestamp (defaults to now).
    pub created_at: Option<DateTime<Utc>>,
    /// Overrides the computed `created_at + duration` expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewPaymentLink {
    /// Request with every required field set.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
        creator_address: impl Into<String>,
        payment_token: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            amount: Some(amount.into()),
            payment_token: Some(payment_token.into()),
            creator_address: Some(creator_address.into()),
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, days: i64) -> Self {
        self.duration = Some(days);
        self
    }

    pub fn with_creator_id(mut self, creator_id: impl Into<String>) -> Self {
        self.creator_id = Some(creator_id.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Identifiers of a freshly created link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPaymentLink {
    /// Public short id.
    pub payment_link_id: String,
    /// Store-assigned identifier.
    pub record_id: String,
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LinkError::MissingField(field)),
    }
}

/// Creates, fetches and lists payment links on top of a [`PaymentLinkStore`].
///
/// # Example
///
/// ```
/// use stackfund_lib::{InMemoryLinkStore, NewPaymentLink, PaymentLinkService};
///
/// # tokio_test_block(async {
/// let service = PaymentLinkService::new(InMemoryLinkStore::new());
/// let created = service
///     .create(NewPaymentLink::new("Title", "Description", "0.5", "ST1ABC", "sBTC"))
///     .await
///     .unwrap();
/// let link = service.get_by_id(&created.payment_link_id).await.unwrap();
/// assert_eq!(link.payment_count, 0);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
/// # }
/// ```
pub struct PaymentLinkService<S, G = RandomIdGenerator> {
    store: S,
    generator: G,
    config: ServiceConfig,
}

impl<S: PaymentLinkStore> PaymentLinkService<S, RandomIdGenerator> {
    /// Service with the random generator and default configuration.
    pub fn new(store: S) -> Self {
        Self::with_parts(store, RandomIdGenerator, ServiceConfig::default())
    }
}

impl<S: PaymentLinkStore, G: LinkIdGenerator> PaymentLinkService<S, G> {
    pub fn with_parts(store: S, generator: G, config: ServiceConfig) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn timed<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        let limit = self.config.store_timeout();
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms = self.config.store_timeout_ms, "store call timed out");
                Err(StoreError::Unavailable(format!(
                    "{} timed out after {}ms",
                    operation, self.config.store_timeout_ms
                )))
            }
        }
    }

    /// Validate the request and build the record, minus its short id.
    fn build_record(&self, input: NewPaymentLink) -> Result<PaymentLink> {
        let title = required(input.title, "title")?;
        let description = required(input.description, "description")?;
        let amount = required(input.amount, "amount")?;
        let creator_address = required(input.creator_address, "creatorAddress")?;
        let payment_token = required(input.payment_token, "paymentToken")?;

        let amount = Amount::from_str_checked(&amount)
            .ok()
            .filter(Amount::is_positive)
            .ok_or_else(|| LinkError::InvalidAmount("must be a positive number".to_string()))?;

        let duration = input
            .duration
            .filter(|d| *d > 0)
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(self.config.default_duration_days);

        let created_at = input.created_at.unwrap_or_else(Utc::now);
        let expires_at = input.expires_at.unwrap_or_else(|| {
            created_at
                .checked_add_signed(Duration::days(i64::from(duration)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        Ok(PaymentLink {
            record_id: String::new(),
            id: String::new(),
            title,
            description,
            amount,
            duration,
            payment_token,
            creator_address,
            creator_id: input.creator_id.filter(|c| !c.is_empty()),
            status: LinkStatus::Active,
            created_at,
            expires_at,
            payments: Vec::new(),
            total_paid: Amount::zero(),
            payment_count: 0,
        })
    }

    /// Create a payment link with a freshly allocated short id.
    ///
    /// # Errors
    ///
    /// - `MissingField` for the first absent field in the order title,
    ///   description, amount, creatorAddress, paymentToken
    /// - `InvalidAmount` if the amount is not a positive number
    /// - `StorageUnavailable` if the store fails or times out
    /// - `IdSpaceExhausted` if every candidate collided
    pub async fn create(&self, input: NewPaymentLink) -> Result<CreatedPaymentLink> {
        let template = self.build_record(input)?;
        let max_attempts = self.config.max_id_attempts;

        for attempt in 1..=max_attempts {
            let candidate = self.generator.generate();

            if self.timed("exists", self.store.exists(&candidate)).await? {
                debug!(attempt, candidate = %candidate, "payment link id already taken");
                continue;
            }

            let mut link = template.clone();
            link.id = candidate.clone();

            match self.timed("insert", self.store.insert(link)).await {
                Ok(record_id) => {
                    info!(
                        payment_link_id = %candidate,
                        creator = %template.creator_address,
                        attempt,
                        "created payment link"
                    );
                    return Ok(CreatedPaymentLink {
                        payment_link_id: candidate,
                        record_id,
                    });
                }
                Err(StoreError::DuplicateKey(id)) => {
                    debug!(attempt, candidate = %id, "lost insert race, regenerating id");
                }
                Err(e) => {
                    warn!(error = %e, "failed to store payment link");
                    return Err(e.into());
                }
            }
        }

        warn!(attempts = max_attempts, "payment link id allocation exhausted");
        Err(LinkError::IdSpaceExhausted {
            attempts: max_attempts,
        })
    }

    /// Fetch one link by its short id.
    pub async fn get_by_id(&self, id: &str) -> Result<PaymentLink> {
        self.timed("find_by_id", self.store.find_by_id(id))
            .await?
            .ok_or_else(|| LinkError::NotFound(id.to_string()))
    }

    /// All links created by `address`, newest first, with `is_expired`
    /// evaluated now.
    pub async fn list_by_creator(&self, address: &str) -> Result<Vec<PaymentLinkView>> {
        self.list_by_creator_at(address, Utc::now()).await
    }

    /// Like [`list_by_creator`](Self::list_by_creator) with an explicit clock.
    pub async fn list_by_creator_at(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<PaymentLinkView>> {
        let links = self
            .timed(
                "find_by_creator_address",
                self.store.find_by_creator_address(address),
            )
            .await?;
        debug!(creator = %address, count = links.len(), "listed payment links");
        Ok(links.into_iter().map(|l| l.view_at(now)).collect())
    }

    /// Probe the store.
    pub async fn health(&self) -> Result<()> {
        self.timed("health_check", self.store.health_check())
            .await
            .map_err(LinkError::from)
    }
}
