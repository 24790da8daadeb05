use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;
use crate::waitlist;

#[derive(Debug, Deserialize)]
pub struct PromoteBody {
    pub event_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AcceptBody {
    pub token: String,
}

/// `POST /events/waitlist-promote`
pub async fn waitlist_promote(
    State(state): State<AppState>,
    Json(body): Json<PromoteBody>,
) -> Result<Response, AppError> {
    let outcome = waitlist::promote(&state.pool, &state.config, body.event_id).await?;
    Ok(success(outcome).into_response())
}

/// `POST /events/offer-accept`
pub async fn offer_accept(
    State(state): State<AppState>,
    Json(body): Json<AcceptBody>,
) -> Result<Response, AppError> {
    if body.token.trim().is_empty() {
        return Err(AppError::ValidationError("token is required".to_string()));
    }
    let outcome =
        waitlist::accept(&state.pool, &state.config, &state.payments, &body.token).await?;
    Ok(success(outcome).into_response())
}
