//! StackFund payment link registry.
//!
//! A payment link is a shareable request for a fixed amount of a token,
//! addressed by an 8-character short id and owned by a creator address. This
//! crate allocates those ids, validates creation requests and persists the
//! records through a pluggable [`PaymentLinkStore`].
//!
//! # Components
//!
//! - **ID generation**: [`id::RandomIdGenerator`] behind the [`LinkIdGenerator`] trait
//! - **Storage**: [`InMemoryLinkStore`] and the durable [`FileLinkStore`]
//! - **Service**: [`PaymentLinkService`], the only writer of records
//!
//! # Example
//!
//! ```ignore
//! use stackfund_lib::{FileLinkStore, NewPaymentLink, PaymentLinkService};
//!
//! let service = PaymentLinkService::new(FileLinkStore::new("/var/lib/stackfund")?);
//! let created = service
//!     .create(NewPaymentLink::new("Help fund my project", "...", "0.5", "ST1ABC", "sBTC"))
//!     .await?;
//! let mine = service.list_by_creator("ST1ABC").await?;
//! ```

pub mod amount;
pub mod config;
pub mod errors;
pub mod id;
pub mod link;
pub mod service;
pub mod storage;

/// Test utilities for the registry.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use amount::Amount;
pub use config::{ConfigError, ServiceConfig};
pub use errors::{LinkError, LinkErrorCode, StoreError};
pub use id::{LinkIdGenerator, RandomIdGenerator};
pub use link::{LinkStatus, PaymentLink, PaymentLinkView, PaymentRecord};
pub use service::{CreatedPaymentLink, NewPaymentLink, PaymentLinkService};
pub use storage::{FileLinkStore, InMemoryLinkStore, PaymentLinkStore};

/// Common result alias for payment link operations.
pub type Result<T> = std::result::Result<T, LinkError>;
