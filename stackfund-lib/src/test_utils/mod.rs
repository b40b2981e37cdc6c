//! Test utilities for the payment link registry.
//!
//! - Deterministic id generators for forcing collisions
//! - Stores that inject races, outages and stalls around a real backend
//! - Record fixtures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stackfund_lib::test_utils::{ScriptedIdGenerator, RacingStore};
//!
//! // First candidate loses a race inside insert, second one lands.
//! let generator = ScriptedIdGenerator::new(["taken000", "fresh000"]);
//! let store = RacingStore::new(InMemoryLinkStore::new(), 1);
//! ```

mod fixtures;
mod generators;
mod stores;

pub use fixtures::{link_fixture, sample_request};
pub use generators::ScriptedIdGenerator;
pub use stores::{FailingStore, RacingStore, StalledStore};
