//! Storage operations for the waitlist flows. The seat reservation is the
//! only contended write in the system; it is a conditional decrement so two
//! racing promotions can never oversell a ticket, and the expired-seat
//! return is a single transaction conditioned on the token still being
//! attached, so a seat is returned at most once per issued offer.
//!
//! The trait exists so the flows can run against an in-memory double in
//! tests; `PgPool` is the production implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::{EventTicket, Registration, STATUS_PAID, STATUS_WAITLIST};
use crate::utils::error::AppError;

const TICKET_COLUMNS: &str =
    "id, event_id, name, currency, price_cents, qty, created_at, updated_at";
const REG_COLUMNS: &str = "id, event_id, ticket_id, email, status, offer_token, \
     offer_expires_at, offer_sent_at, payment_url, payment_intent_id, created_at, updated_at";

pub trait EventStore: Send + Sync {
    async fn available_tickets(&self, event_id: Uuid) -> Result<Vec<EventTicket>, AppError>;

    async fn ticket_by_id(&self, ticket_id: Uuid) -> Result<Option<EventTicket>, AppError>;

    /// Oldest waitlisted registration for the event, if any.
    async fn oldest_waitlisted(&self, event_id: Uuid) -> Result<Option<Registration>, AppError>;

    async fn registration_by_token(&self, token: &str) -> Result<Option<Registration>, AppError>;

    /// Conditional decrement. Returns false when the quantity already hit
    /// zero, which means another promotion (or a purchase) won the race.
    async fn reserve_seat(&self, ticket_id: Uuid) -> Result<bool, AppError>;

    /// Inverse of `reserve_seat`; compensation after a failed offer write.
    async fn release_seat(&self, ticket_id: Uuid) -> Result<(), AppError>;

    async fn attach_offer(
        &self,
        registration_id: Uuid,
        ticket_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Lazy inverse of a promotion whose offer lapsed: strip the offer and
    /// give the seat back, in one atomic step conditioned on `token` still
    /// being attached. Returns false when another request already returned
    /// the seat; the increment happens exactly once per issued offer.
    async fn return_expired_seat(
        &self,
        registration_id: Uuid,
        token: &str,
        ticket_id: Option<Uuid>,
    ) -> Result<bool, AppError>;

    async fn mark_paid(&self, registration_id: Uuid) -> Result<(), AppError>;

    async fn save_payment_link(
        &self,
        registration_id: Uuid,
        payment_url: &str,
        payment_intent_id: &str,
    ) -> Result<(), AppError>;
}

impl EventStore for PgPool {
    async fn available_tickets(&self, event_id: Uuid) -> Result<Vec<EventTicket>, AppError> {
        let tickets = sqlx::query_as::<_, EventTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM event_tickets \
             WHERE event_id = $1 AND qty > 0 ORDER BY created_at"
        ))
        .bind(event_id)
        .fetch_all(self)
        .await?;
        Ok(tickets)
    }

    async fn ticket_by_id(&self, ticket_id: Uuid) -> Result<Option<EventTicket>, AppError> {
        let ticket = sqlx::query_as::<_, EventTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM event_tickets WHERE id = $1"
        ))
        .bind(ticket_id)
        .fetch_optional(self)
        .await?;
        Ok(ticket)
    }

    async fn oldest_waitlisted(&self, event_id: Uuid) -> Result<Option<Registration>, AppError> {
        let reg = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REG_COLUMNS} FROM event_regs \
             WHERE event_id = $1 AND status = $2 ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(event_id)
        .bind(STATUS_WAITLIST)
        .fetch_optional(self)
        .await?;
        Ok(reg)
    }

    async fn registration_by_token(&self, token: &str) -> Result<Option<Registration>, AppError> {
        let reg = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REG_COLUMNS} FROM event_regs WHERE offer_token = $1"
        ))
        .bind(token)
        .fetch_optional(self)
        .await?;
        Ok(reg)
    }

    async fn reserve_seat(&self, ticket_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE event_tickets SET qty = qty - 1, updated_at = now() \
             WHERE id = $1 AND qty > 0",
        )
        .bind(ticket_id)
        .execute(self)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_seat(&self, ticket_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE event_tickets SET qty = qty + 1, updated_at = now() WHERE id = $1")
            .bind(ticket_id)
            .execute(self)
            .await?;
        Ok(())
    }

    async fn attach_offer(
        &self,
        registration_id: Uuid,
        ticket_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE event_regs SET ticket_id = $2, offer_token = $3, offer_expires_at = $4, \
             offer_sent_at = $5, updated_at = now() WHERE id = $1",
        )
        .bind(registration_id)
        .bind(ticket_id)
        .bind(token)
        .bind(expires_at)
        .bind(sent_at)
        .execute(self)
        .await?;
        Ok(())
    }

    async fn return_expired_seat(
        &self,
        registration_id: Uuid,
        token: &str,
        ticket_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let mut tx = self.begin().await?;

        // The token condition makes this a claim: whichever request clears
        // the offer owns the seat return, everyone else affects zero rows.
        let cleared = sqlx::query(
            "UPDATE event_regs SET offer_token = NULL, offer_expires_at = NULL, \
             offer_sent_at = NULL, updated_at = now() \
             WHERE id = $1 AND offer_token = $2",
        )
        .bind(registration_id)
        .bind(token)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if cleared {
            if let Some(ticket_id) = ticket_id {
                sqlx::query(
                    "UPDATE event_tickets SET qty = qty + 1, updated_at = now() WHERE id = $1",
                )
                .bind(ticket_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(cleared)
    }

    async fn mark_paid(&self, registration_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE event_regs SET status = $2, updated_at = now() WHERE id = $1")
            .bind(registration_id)
            .bind(STATUS_PAID)
            .execute(self)
            .await?;
        Ok(())
    }

    async fn save_payment_link(
        &self,
        registration_id: Uuid,
        payment_url: &str,
        payment_intent_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE event_regs SET payment_url = $2, payment_intent_id = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(registration_id)
        .bind(payment_url)
        .bind(payment_intent_id)
        .execute(self)
        .await?;
        Ok(())
    }
}
