//! HTTP surface for payment links.
//!
//! ```text
//! POST /payment-links                         create a link
//! GET  /payment-links?id=<id>                 fetch one link
//! GET  /payment-links?creatorAddress=<addr>   list a creator's links
//! GET  /health                                store probe
//! ```
//!
//! The link routes are also served under `/api` for the web client.

pub mod dto;
pub mod error;
pub mod handlers;

use axum::routing::get;
use axum::Router;
use stackfund_lib::{PaymentLinkService, PaymentLinkStore, ServiceConfig};
use std::sync::Arc;

pub use error::ApiError;

/// Store handle shared by every request.
pub type SharedStore = Arc<dyn PaymentLinkStore>;

/// Service type behind the router.
pub type LinkService = PaymentLinkService<SharedStore>;

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LinkService>,
}

impl AppState {
    pub fn new(store: SharedStore, config: ServiceConfig) -> Self {
        Self {
            service: Arc::new(PaymentLinkService::with_parts(
                store,
                stackfund_lib::RandomIdGenerator,
                config,
            )),
        }
    }
}

fn link_routes() -> Router<AppState> {
    Router::new().route(
        "/payment-links",
        get(handlers::get_payment_links).post(handlers::create_payment_link),
    )
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(link_routes())
        .nest("/api", link_routes())
        .route("/health", get(handlers::health))
        .with_state(state)
}
