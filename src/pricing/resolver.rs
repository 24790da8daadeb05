use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{BillingType, Discount, FxRates, Offer, PriceOverride, PricingSettings};
use crate::pricing::discount::{best_discount, AppliedDiscount};
use crate::pricing::rounding::psych_round;

/// Where the base price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceSource {
    Override,
    Fx,
    FxFallback,
    Free,
}

/// Everything the resolver needs, pre-fetched by the store layer.
#[derive(Debug, Clone)]
pub struct PricingInputs {
    pub offer: Offer,
    pub settings: PricingSettings,
    /// Override row for (offer, normalized target currency), if any.
    pub price_override: Option<PriceOverride>,
    /// FX row for the offer's base currency, if any.
    pub fx: Option<FxRates>,
    pub coupon: Option<Discount>,
    pub promo: Option<Discount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    pub currency: String,
    pub base_cents: i64,
    pub amount_cents: i64,
    pub discount_cents: i64,
    pub applied: Option<AppliedDiscount>,
    pub source: PriceSource,
}

/// Resolve the final charge amount for an offer in a target currency.
///
/// Base resolution runs override, then same-currency, then FX with the
/// configured buffer. A missing FX rate degrades to the offer's own base
/// currency rather than failing; the caller gets that currency back in the
/// quote. Discounts are evaluated last against whatever base survived.
pub fn resolve_price(inputs: &PricingInputs, target_currency: &str, now: DateTime<Utc>) -> PriceQuote {
    let offer = &inputs.offer;
    let settings = &inputs.settings;
    let currency = settings.normalize_currency(target_currency);

    if offer.billing() != BillingType::Paid {
        return PriceQuote {
            currency,
            base_cents: 0,
            amount_cents: 0,
            discount_cents: 0,
            applied: None,
            source: PriceSource::Free,
        };
    }

    let (currency, base_cents, source) = resolve_base(offer, settings, &currency, inputs);

    let (amount_cents, applied) = best_discount(
        base_cents,
        &currency,
        &offer.slug,
        inputs.coupon.as_ref(),
        inputs.promo.as_ref(),
        now,
    );

    PriceQuote {
        currency,
        base_cents,
        discount_cents: (base_cents - amount_cents).max(0),
        amount_cents,
        applied,
        source,
    }
}

fn resolve_base(
    offer: &Offer,
    settings: &PricingSettings,
    currency: &str,
    inputs: &PricingInputs,
) -> (String, i64, PriceSource) {
    let cny_mode = settings.cny_rounding();

    // Overrides are verbatim: no FX, no buffer, no rounding.
    if let Some(ov) = &inputs.price_override {
        if ov.currency == currency {
            return (currency.to_string(), ov.price_cents, PriceSource::Override);
        }
    }

    if currency == offer.base_currency {
        let cents = psych_round(offer.base_price_cents, currency, cny_mode);
        return (currency.to_string(), cents, PriceSource::Fx);
    }

    let rate = inputs.fx.as_ref().and_then(|fx| fx.rate_for(currency));
    match rate {
        Some(rate) => {
            let raw = (offer.base_price_cents as f64 * rate).round() as i64;
            let bps = settings.buffer_bps();
            let buffered = (raw * (10_000 + bps) + 5_000) / 10_000;
            let cents = psych_round(buffered, currency, cny_mode);
            (currency.to_string(), cents, PriceSource::Fx)
        }
        None => {
            // Never fail a price request over a missing rate; degrade to
            // the offer's native currency.
            let cents = psych_round(offer.base_price_cents, &offer.base_currency, cny_mode);
            (offer.base_currency.clone(), cents, PriceSource::FxFallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn offer(currency: &str, cents: i64) -> Offer {
        Offer {
            id: Uuid::new_v4(),
            slug: "intro-call".to_string(),
            title: "Intro call".to_string(),
            billing_type: "paid".to_string(),
            base_currency: currency.to_string(),
            base_price_cents: cents,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn settings() -> PricingSettings {
        PricingSettings {
            id: Uuid::new_v4(),
            buffer_bps: Some(150),
            supported: vec!["USD".into(), "CNY".into(), "EUR".into()],
            cny_rounding: "yuan".to_string(),
        }
    }

    fn fx(base: &str, pairs: &[(&str, f64)]) -> FxRates {
        let rates: HashMap<String, f64> =
            pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect();
        FxRates {
            base_currency: base.to_string(),
            rates: Json(rates),
            updated_at: Utc::now(),
        }
    }

    fn inputs(offer: Offer) -> PricingInputs {
        PricingInputs {
            offer,
            settings: settings(),
            price_override: None,
            fx: None,
            coupon: None,
            promo: None,
        }
    }

    #[test]
    fn same_currency_gets_psych_rounded() {
        let quote = resolve_price(&inputs(offer("USD", 2000)), "USD", Utc::now());
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.amount_cents, 1999);
        assert_eq!(quote.source, PriceSource::Fx);
        assert!(quote.applied.is_none());
    }

    #[test]
    fn fx_conversion_with_buffer_and_yuan_rounding() {
        let mut i = inputs(offer("USD", 3000));
        i.fx = Some(fx("USD", &[("CNY", 7.0)]));
        let quote = resolve_price(&i, "CNY", Utc::now());
        // raw 21000, buffered 21315, rounded to whole yuan.
        assert_eq!(quote.currency, "CNY");
        assert_eq!(quote.amount_cents, 21300);
    }

    #[test]
    fn missing_rate_falls_back_to_base_currency() {
        let mut i = inputs(offer("USD", 2000));
        i.fx = Some(fx("USD", &[("EUR", 0.9)]));
        let quote = resolve_price(&i, "CNY", Utc::now());
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.amount_cents, 1999);
        assert_eq!(quote.source, PriceSource::FxFallback);
    }

    #[test]
    fn override_wins_over_fx_and_buffer() {
        let base = offer("USD", 2000);
        let mut i = inputs(base.clone());
        i.fx = Some(fx("USD", &[("EUR", 0.9)]));
        i.price_override = Some(PriceOverride {
            id: Uuid::new_v4(),
            offer_id: base.id,
            currency: "EUR".to_string(),
            price_cents: 1777,
        });
        let quote = resolve_price(&i, "EUR", Utc::now());
        // Verbatim, not even rounded.
        assert_eq!(quote.amount_cents, 1777);
        assert_eq!(quote.source, PriceSource::Override);
    }

    #[test]
    fn unsupported_currency_is_replaced_before_lookup() {
        let quote = resolve_price(&inputs(offer("USD", 2000)), "JPY", Utc::now());
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.amount_cents, 1999);
    }

    #[test]
    fn free_offer_short_circuits() {
        let mut o = offer("USD", 2000);
        o.billing_type = "free".to_string();
        let quote = resolve_price(&inputs(o), "USD", Utc::now());
        assert_eq!(quote.amount_cents, 0);
        assert_eq!(quote.source, PriceSource::Free);
        assert!(quote.applied.is_none());
    }

    #[test]
    fn best_of_coupon_and_promo() {
        let mut i = inputs(offer("USD", 1000));
        // No rounding noise: 1000 rounds to 999.
        let coupon = Discount::from(crate::models::discount::Coupon {
            id: Uuid::new_v4(),
            code: "TWENTY".to_string(),
            percent_off: Some(20),
            amount_off_cents: None,
            currency: None,
            applies_to_slug: None,
            active: true,
            valid_from: None,
            valid_to: None,
        });
        let promo = Discount::from(crate::models::discount::Promotion {
            id: Uuid::new_v4(),
            code: "FLAT300".to_string(),
            percent_off: None,
            amount_off_cents: Some(300),
            currency: Some("USD".to_string()),
            applies_to_slug: None,
            active: true,
            starts_at: None,
            expires_at: None,
        });
        i.coupon = Some(coupon);
        i.promo = Some(promo);

        let quote = resolve_price(&i, "USD", Utc::now());
        assert_eq!(quote.base_cents, 999);
        // 20% off 999 = 799; 300 off 999 = 699. Promo wins.
        assert_eq!(quote.amount_cents, 699);
        assert_eq!(quote.discount_cents, 300);
        assert_eq!(quote.applied.unwrap().kind, crate::models::DiscountKind::Promo);
    }

    #[test]
    fn discount_is_monotone() {
        let mut i = inputs(offer("USD", 5000));
        i.coupon = Some(Discount {
            kind: crate::models::DiscountKind::Coupon,
            code: "HALF".to_string(),
            percent_off: Some(50),
            amount_off_cents: None,
            currency: None,
            applies_to_slug: None,
            active: true,
            valid_from: None,
            valid_to: None,
        });
        let quote = resolve_price(&i, "USD", Utc::now());
        assert!(quote.amount_cents <= quote.base_cents);
        assert!(quote.discount_cents >= 0);
        assert_eq!(quote.discount_cents, quote.base_cents - quote.amount_cents);
    }
}
