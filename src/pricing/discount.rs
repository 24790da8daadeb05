use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Discount, DiscountKind};

/// The winning discount, reported back to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppliedDiscount {
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub code: String,
    pub percent_off: Option<i32>,
    pub amount_off_cents: Option<i64>,
}

struct Candidate<'a> {
    amount: i64,
    discount: Option<&'a Discount>,
}

/// Pick the cheapest of: no discount, the coupon, the promotion.
///
/// Candidates are considered in that order and ties go to the earliest, so
/// a discount that saves nothing is never reported as applied. Returns the
/// final amount and the winner, if any.
pub fn best_discount(
    base_cents: i64,
    currency: &str,
    slug: &str,
    coupon: Option<&Discount>,
    promo: Option<&Discount>,
    now: DateTime<Utc>,
) -> (i64, Option<AppliedDiscount>) {
    let mut candidates = vec![Candidate {
        amount: base_cents,
        discount: None,
    }];
    for discount in [coupon, promo].into_iter().flatten() {
        if discount.is_valid(slug, now) {
            candidates.push(Candidate {
                amount: apply_discount(base_cents, currency, discount),
                discount: Some(discount),
            });
        }
    }

    // min_by_key keeps the first of equal elements.
    let winner = candidates
        .into_iter()
        .min_by_key(|c| c.amount)
        .unwrap_or(Candidate {
            amount: base_cents,
            discount: None,
        });

    let applied = winner.discount.map(|d| AppliedDiscount {
        kind: d.kind,
        code: d.code.clone(),
        percent_off: d.percent_off,
        amount_off_cents: d.amount_off_cents,
    });
    (winner.amount, applied)
}

/// Percent-off first, then amount-off. A cross-currency amount-off is not
/// convertible and counts as zero.
fn apply_discount(base_cents: i64, currency: &str, discount: &Discount) -> i64 {
    let mut amount = base_cents;
    if let Some(pct) = discount.percent_off {
        let pct = i64::from(pct).clamp(0, 100);
        amount = (amount * (100 - pct) + 50) / 100;
    }
    if let Some(off) = discount.amount_off_cents {
        let currency_matches = discount
            .currency
            .as_deref()
            .map(|c| c == currency)
            .unwrap_or(true);
        if currency_matches {
            amount = (amount - off).max(0);
        }
    }
    amount
}
