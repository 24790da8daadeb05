//! Read-side queries for the price resolver. Everything here is a plain
//! fetch; the pipeline itself is pure and lives in `crate::pricing`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::discount::{Coupon, Promotion};
use crate::models::{Discount, FxRates, Offer, PriceOverride, PricingSettings};
use crate::utils::error::AppError;

pub async fn pricing_settings(pool: &PgPool) -> Result<PricingSettings, AppError> {
    let settings = sqlx::query_as::<_, PricingSettings>(
        "SELECT id, buffer_bps, supported, cny_rounding FROM pricing_settings LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    settings.ok_or_else(|| AppError::ConfigError("pricing_settings row is missing".to_string()))
}

pub async fn offer_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Offer>, AppError> {
    let offer = sqlx::query_as::<_, Offer>(
        r#"
        SELECT id, slug, title, billing_type, base_currency, base_price_cents,
               active, created_at, updated_at
        FROM offers
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(offer)
}

pub async fn price_override(
    pool: &PgPool,
    offer_id: Uuid,
    currency: &str,
) -> Result<Option<PriceOverride>, AppError> {
    let row = sqlx::query_as::<_, PriceOverride>(
        "SELECT id, offer_id, currency, price_cents FROM price_overrides \
         WHERE offer_id = $1 AND currency = $2",
    )
    .bind(offer_id)
    .bind(currency)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn fx_rates(pool: &PgPool, base_currency: &str) -> Result<Option<FxRates>, AppError> {
    let row = sqlx::query_as::<_, FxRates>(
        "SELECT base_currency, rates, updated_at FROM fx_rates WHERE base_currency = $1",
    )
    .bind(base_currency)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn coupon_by_code(pool: &PgPool, code: &str) -> Result<Option<Discount>, AppError> {
    let row = sqlx::query_as::<_, Coupon>(
        r#"
        SELECT id, code, percent_off, amount_off_cents, currency,
               applies_to_slug, active, valid_from, valid_to
        FROM coupons
        WHERE code = $1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Discount::from))
}

pub async fn promotion_by_code(pool: &PgPool, code: &str) -> Result<Option<Discount>, AppError> {
    let row = sqlx::query_as::<_, Promotion>(
        r#"
        SELECT id, code, percent_off, amount_off_cents, currency,
               applies_to_slug, active, starts_at, expires_at
        FROM promotions
        WHERE code = $1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Discount::from))
}
