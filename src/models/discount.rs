use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Raw coupon row. Validity window is `valid_from`/`valid_to`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub percent_off: Option<i32>,
    pub amount_off_cents: Option<i64>,
    pub currency: Option<String>,
    pub applies_to_slug: Option<String>,
    pub active: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

/// Raw promotion row. Same shape as a coupon but the window is
/// `starts_at`/`expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Promotion {
    pub id: Uuid,
    pub code: String,
    pub percent_off: Option<i32>,
    pub amount_off_cents: Option<i64>,
    pub currency: Option<String>,
    pub applies_to_slug: Option<String>,
    pub active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Coupon,
    Promo,
}

/// Unified view over coupons and promotions so best-of selection runs over
/// one list instead of duplicated branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub kind: DiscountKind,
    pub code: String,
    pub percent_off: Option<i32>,
    pub amount_off_cents: Option<i64>,
    pub currency: Option<String>,
    pub applies_to_slug: Option<String>,
    pub active: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl Discount {
    /// Active, inside the validity window (inclusive), and either global
    /// or restricted to the requested offer slug.
    pub fn is_valid(&self, slug: &str, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        if let Some(from) = self.valid_from {
            if now < from {
                return false;
            }
        }
        if let Some(to) = self.valid_to {
            if now > to {
                return false;
            }
        }
        match &self.applies_to_slug {
            Some(restricted) => restricted == slug,
            None => true,
        }
    }
}

impl From<Coupon> for Discount {
    fn from(c: Coupon) -> Self {
        Self {
            kind: DiscountKind::Coupon,
            code: c.code,
            percent_off: c.percent_off,
            amount_off_cents: c.amount_off_cents,
            currency: c.currency,
            applies_to_slug: c.applies_to_slug,
            active: c.active,
            valid_from: c.valid_from,
            valid_to: c.valid_to,
        }
    }
}

impl From<Promotion> for Discount {
    fn from(p: Promotion) -> Self {
        Self {
            kind: DiscountKind::Promo,
            code: p.code,
            percent_off: p.percent_off,
            amount_off_cents: p.amount_off_cents,
            currency: p.currency,
            applies_to_slug: p.applies_to_slug,
            active: p.active,
            valid_from: p.starts_at,
            valid_to: p.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn discount() -> Discount {
        Discount {
            kind: DiscountKind::Coupon,
            code: "WELCOME".to_string(),
            percent_off: Some(10),
            amount_off_cents: None,
            currency: None,
            applies_to_slug: None,
            active: true,
            valid_from: None,
            valid_to: None,
        }
    }

    #[test]
    fn inactive_discount_is_invalid() {
        let mut d = discount();
        d.active = false;
        assert!(!d.is_valid("intro-call", Utc::now()));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let now = Utc::now();
        let mut d = discount();
        d.valid_from = Some(now);
        d.valid_to = Some(now);
        assert!(d.is_valid("intro-call", now));
        assert!(!d.is_valid("intro-call", now + Duration::seconds(1)));
        assert!(!d.is_valid("intro-call", now - Duration::seconds(1)));
    }

    #[test]
    fn slug_restriction_must_match() {
        let mut d = discount();
        d.applies_to_slug = Some("deep-dive".to_string());
        assert!(d.is_valid("deep-dive", Utc::now()));
        assert!(!d.is_valid("intro-call", Utc::now()));
    }
}
