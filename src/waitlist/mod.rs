//! Waitlist promotion and offer acceptance.
//!
//! Promotion reserves a seat with a conditional decrement and then writes a
//! time-limited offer onto the oldest waitlisted registration. The two
//! writes are not wrapped in a transaction; if the offer write fails the
//! seat is released again. That compensation is best-effort: if the release
//! itself fails, the inconsistency is logged for admin correction and the
//! decrement stays visible without an offer. Acceptance performs the
//! inverse compensation lazily, returning the seat when an expired token is
//! presented; the return is claimed atomically so it happens at most once
//! per issued offer.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::models::EventTicket;
use crate::payments::{PaymentClient, PaymentLinkRequest};
use crate::store::events::EventStore;
use crate::utils::error::AppError;

pub const OFFER_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize)]
pub struct PromotionOutcome {
    pub promoted: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PromotionOutcome {
    fn nobody() -> Self {
        Self {
            promoted: 0,
            offer_url: None,
            email: None,
            expires_at: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AcceptanceOutcome {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

/// Promote the oldest waitlisted registration onto spare inventory.
///
/// `promoted: 0` covers every expected terminal state with nothing to do:
/// no spare tickets, no waitlist, or the seat raced away between the
/// snapshot and the decrement.
pub async fn promote<S: EventStore>(
    store: &S,
    config: &Config,
    event_id: Uuid,
) -> Result<PromotionOutcome, AppError> {
    let available = store.available_tickets(event_id).await?;
    if available.is_empty() {
        return Ok(PromotionOutcome::nobody());
    }

    let Some(registration) = store.oldest_waitlisted(event_id).await? else {
        return Ok(PromotionOutcome::nobody());
    };

    let Some(ticket) = choose_ticket(&available, registration.ticket_id) else {
        return Ok(PromotionOutcome::nobody());
    };

    let token = offer_token();
    let now = Utc::now();
    let expires_at = now + Duration::hours(OFFER_TTL_HOURS);

    if !store.reserve_seat(ticket.id).await? {
        // Lost the race for the last seat; nothing was mutated.
        return Ok(PromotionOutcome::nobody());
    }

    if let Err(write_err) = store
        .attach_offer(registration.id, ticket.id, &token, expires_at, now)
        .await
    {
        if let Err(release_err) = store.release_seat(ticket.id).await {
            tracing::error!(
                ticket_id = %ticket.id,
                registration_id = %registration.id,
                error = ?release_err,
                "Seat release after failed offer write also failed; inventory needs admin correction"
            );
        }
        return Err(write_err);
    }

    tracing::info!(
        event_id = %event_id,
        registration_id = %registration.id,
        ticket_id = %ticket.id,
        "Issued waitlist offer"
    );

    Ok(PromotionOutcome {
        promoted: 1,
        offer_url: Some(offer_url(config, &token)),
        email: Some(registration.email),
        expires_at: Some(expires_at),
    })
}

/// Accept an outstanding offer by token.
pub async fn accept<S: EventStore>(
    store: &S,
    config: &Config,
    payments: &PaymentClient,
    token: &str,
) -> Result<AcceptanceOutcome, AppError> {
    let registration = store
        .registration_by_token(token)
        .await?
        .ok_or(AppError::InvalidToken)?;

    if !registration.is_waitlisted() {
        return Err(AppError::AlreadyProcessed);
    }

    let now = Utc::now();
    if registration.offer_expired(now) {
        // Lazy inverse of the promotion. A concurrent accept of the same
        // token loses the claim inside the store and returns no extra seat.
        store
            .return_expired_seat(registration.id, token, registration.ticket_id)
            .await?;
        return Err(AppError::OfferExpired);
    }

    let ticket_id = registration
        .ticket_id
        .ok_or_else(|| AppError::NotFound("registration has no ticket attached".to_string()))?;
    let ticket = store
        .ticket_by_id(ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("ticket {ticket_id} not found")))?;

    if ticket.price_cents == 0 {
        store.mark_paid(registration.id).await?;
        return Ok(AcceptanceOutcome {
            status: "paid",
            payment_url: None,
        });
    }

    let link = payments
        .create_payment_link(&PaymentLinkRequest {
            amount_cents: ticket.price_cents,
            currency: ticket.currency.clone(),
            reference: registration.id.to_string(),
            return_url: format!("{}/events/thanks", config.public_base_url),
        })
        .await?;
    store
        .save_payment_link(registration.id, &link.url, &link.id)
        .await?;

    // Status stays waitlist until the payment webhook lands.
    Ok(AcceptanceOutcome {
        status: "payment_pending",
        payment_url: Some(link.url),
    })
}

/// Prefer the registration's own ticket when it still has inventory, else
/// take the first available one.
fn choose_ticket(available: &[EventTicket], preferred: Option<Uuid>) -> Option<&EventTicket> {
    preferred
        .and_then(|id| available.iter().find(|t| t.id == id))
        .or_else(|| available.first())
}

/// 16 random bytes, hex-encoded: a 32-character token.
fn offer_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn offer_url(config: &Config, token: &str) -> String {
    format!("{}/events/offer/{token}", config.public_base_url)
}
