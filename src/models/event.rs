use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_WAITLIST: &str = "waitlist";
pub const STATUS_PAID: &str = "paid";

/// Ticket inventory for an event. `qty` is mutated only by the waitlist
/// promoter and its compensations (plus the purchase flow, elsewhere).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventTicket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub currency: String,
    pub price_cents: i64,
    pub qty: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub ticket_id: Option<Uuid>,
    pub email: String,
    pub status: String,
    pub offer_token: Option<String>,
    pub offer_expires_at: Option<DateTime<Utc>>,
    pub offer_sent_at: Option<DateTime<Utc>>,
    pub payment_url: Option<String>,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn is_waitlisted(&self) -> bool {
        self.status == STATUS_WAITLIST
    }

    pub fn offer_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.offer_expires_at, Some(expires) if expires < now)
    }
}
