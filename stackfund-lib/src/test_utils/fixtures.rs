//! Record and request fixtures.

use crate::{Amount, LinkStatus, NewPaymentLink, PaymentLink};
use chrono::{DateTime, Duration, Utc};

/// A stored-shape link with a 30 day lifetime starting at `created_at`.
pub fn link_fixture(id: &str, creator_address: &str, created_at: DateTime<Utc>) -> PaymentLink {
    PaymentLink {
        record_id: String::new(),
        id: id.to_string(),
        title: format!("Link {}", id),
        description: "Fixture payment link".to_string(),
        amount: Amount::from_str_checked("1.25").unwrap_or_default(),
        duration: 30,
        payment_token: "STX".to_string(),
        creator_address: creator_address.to_string(),
        creator_id: Some("user-fixture".to_string()),
        status: LinkStatus::Active,
        created_at,
        expires_at: created_at + Duration::days(30),
        payments: Vec::new(),
        total_paid: Amount::zero(),
        payment_count: 0,
    }
}

/// The canonical "fund my project" creation request.
pub fn sample_request() -> NewPaymentLink {
    NewPaymentLink::new(
        "Help fund my project",
        "A short project description",
        "0.5",
        "ST1ABC",
        "sBTC",
    )
    .with_duration(7)
}
