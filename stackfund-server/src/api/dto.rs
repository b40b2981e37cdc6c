//! Request and response bodies.
//!
//! The web client is loose about JSON types: `amount` and `duration` arrive as
//! numbers or strings, and timestamps as ISO strings. Creation bodies are
//! therefore read field by field from a JSON object instead of through a
//! strict derive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stackfund_lib::{CreatedPaymentLink, NewPaymentLink, PaymentLinkView};

/// `{ "error": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Response to a successful `POST /payment-links`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub success: bool,
    pub payment_link_id: String,
    /// Store-assigned record id.
    pub id: String,
    pub message: String,
}

impl From<CreatedPaymentLink> for CreatedResponse {
    fn from(created: CreatedPaymentLink) -> Self {
        Self {
            success: true,
            payment_link_id: created.payment_link_id,
            id: created.record_id,
            message: "Payment link created successfully".to_string(),
        }
    }
}

/// Response to `GET /payment-links?creatorAddress=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub success: bool,
    pub payment_links: Vec<PaymentLinkView>,
    pub total: usize,
}

impl From<Vec<PaymentLinkView>> for ListResponse {
    fn from(payment_links: Vec<PaymentLinkView>) -> Self {
        Self {
            success: true,
            total: payment_links.len(),
            payment_links,
        }
    }
}

/// Query string of `GET /payment-links`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkQuery {
    pub id: Option<String>,
    pub creator_address: Option<String>,
}

/// Lookup selected by a [`LinkQuery`]. `id` wins when both are given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkLookup {
    ById(String),
    ByCreator(String),
}

impl LinkQuery {
    pub fn lookup(self) -> Option<LinkLookup> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        let creator = non_empty(self.creator_address);
        match non_empty(self.id) {
            Some(id) => Some(LinkLookup::ById(id)),
            None => creator.map(LinkLookup::ByCreator),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn text(body: &Map<String, Value>, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn whole_days(body: &Map<String, Value>, key: &str) -> Option<i64> {
    match body.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
                .map_or(s.len(), |(i, _)| i);
            s[..end].parse().ok()
        }
        _ => None,
    }
}

fn timestamp(body: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    match body.get(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// Build the service input from a creation body.
///
/// Values of the wrong JSON type read as absent, so the service reports them
/// as missing. Unparseable timestamps are ignored and the defaults apply.
pub fn new_link_from_body(body: &Map<String, Value>) -> NewPaymentLink {
    NewPaymentLink {
        title: text(body, "title"),
        description: text(body, "description"),
        amount: text(body, "amount"),
        duration: whole_days(body, "duration"),
        payment_token: text(body, "paymentToken"),
        creator_address: text(body, "creatorAddress"),
        creator_id: text(body, "creatorId"),
        created_at: timestamp(body, "createdAt"),
        expires_at: timestamp(body, "expiresAt"),
    }
}
