//! HTTP adapters over the price resolver. The handlers only gather rows and
//! hand them to the pure pipeline in `crate::pricing`.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;

use crate::pricing::{resolve_price, PriceQuote, PricingInputs};
use crate::state::AppState;
use crate::store::pricing as store;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct PriceParams {
    pub slug: String,
    pub currency: Option<String>,
    pub coupon: Option<String>,
    pub promo: Option<String>,
}

/// `GET /coaching/price` — resolver without discount codes.
pub async fn price(
    State(state): State<AppState>,
    Query(params): Query<PriceParams>,
) -> Result<Response, AppError> {
    let quote = quote_for(&state.pool, &params.slug, params.currency.as_deref(), None, None).await?;
    Ok(success(quote).into_response())
}

/// `GET /coaching/price-with-discount` — resolver with optional coupon and
/// promotion codes, cheaper result winning.
pub async fn price_with_discount(
    State(state): State<AppState>,
    Query(params): Query<PriceParams>,
) -> Result<Response, AppError> {
    let quote = quote_for(
        &state.pool,
        &params.slug,
        params.currency.as_deref(),
        params.coupon.as_deref(),
        params.promo.as_deref(),
    )
    .await?;
    Ok(success(quote).into_response())
}

async fn quote_for(
    pool: &PgPool,
    slug: &str,
    currency: Option<&str>,
    coupon_code: Option<&str>,
    promo_code: Option<&str>,
) -> Result<PriceQuote, AppError> {
    if slug.trim().is_empty() {
        return Err(AppError::ValidationError("slug is required".to_string()));
    }

    let settings = store::pricing_settings(pool).await?;
    let currency = settings.normalize_currency(currency.unwrap_or_default());

    let offer = store::offer_by_slug(pool, slug)
        .await?
        .filter(|o| o.active)
        .ok_or_else(|| AppError::NotFound(format!("offer '{slug}' not found")))?;

    let price_override = store::price_override(pool, offer.id, &currency).await?;
    let fx = store::fx_rates(pool, &offer.base_currency).await?;

    let coupon = match coupon_code.filter(|c| !c.is_empty()) {
        Some(code) => store::coupon_by_code(pool, code).await?,
        None => None,
    };
    let promo = match promo_code.filter(|c| !c.is_empty()) {
        Some(code) => store::promotion_by_code(pool, code).await?,
        None => None,
    };

    let inputs = PricingInputs {
        offer,
        settings,
        price_override,
        fx,
        coupon,
        promo,
    };
    Ok(resolve_price(&inputs, &currency, Utc::now()))
}
