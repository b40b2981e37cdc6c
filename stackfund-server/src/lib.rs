//! StackFund server
//!
//! HTTP API over [`stackfund_lib`]: create payment links, fetch one by id, and
//! list a creator's links. The binary in `main.rs` wires the router to a
//! listener; tests build the same router against their own stores.

pub mod api;
pub mod config;

pub use api::{router, ApiError, AppState, SharedStore};
pub use config::{ServerConfig, StorageBackend};
