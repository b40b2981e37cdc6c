//! Payment link records and their read-time views.

use crate::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored lifecycle state of a payment link.
///
/// Links are created `Active` and nothing in this crate transitions them.
/// Whether a link has run past its expiry is derived at read time, see
/// [`PaymentLink::is_expired_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Active,
    Expired,
    Completed,
}

/// A payment received against a link.
///
/// Reserved: no operation records payments yet, so `PaymentLink::payments`
/// is always empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub amount: Amount,
    pub payer_address: String,
    pub tx_id: String,
    pub paid_at: DateTime<Utc>,
}

/// A shareable request for a fixed amount of a token, with an expiry.
///
/// Field names on the wire follow the web client: the short id is
/// `paymentLinkId` and the store-assigned identifier is `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLink {
    /// Store-assigned identifier, set by [`PaymentLinkStore::insert`](crate::storage::PaymentLinkStore::insert).
    #[serde(rename = "_id", default)]
    pub record_id: String,
    /// Public 8-character short id.
    #[serde(rename = "paymentLinkId")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub amount: Amount,
    /// Requested lifetime in days.
    pub duration: u32,
    pub payment_token: String,
    pub creator_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    pub total_paid: Amount,
    pub payment_count: u64,
}

impl PaymentLink {
    /// Returns true once `now` is strictly past `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Attach the derived expiry flag as of `now`.
    pub fn view_at(self, now: DateTime<Utc>) -> PaymentLinkView {
        let is_expired = self.is_expired_at(now);
        PaymentLinkView {
            link: self,
            is_expired,
        }
    }
}

/// A payment link as returned by listings, with `isExpired` computed at read
/// time. The flag is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLinkView {
    #[serde(flatten)]
    pub link: PaymentLink,
    pub is_expired: bool,
}
