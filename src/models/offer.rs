use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A purchasable coaching offer. Admin-managed; read-only to pricing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Offer {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub billing_type: String,
    pub base_currency: String,
    pub base_price_cents: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingType {
    Free,
    Paid,
}

impl Offer {
    pub fn billing(&self) -> BillingType {
        if self.billing_type == "paid" {
            BillingType::Paid
        } else {
            BillingType::Free
        }
    }
}

/// Fixed price for one (offer, currency) pair; bypasses FX entirely.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceOverride {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub currency: String,
    pub price_cents: i64,
}
