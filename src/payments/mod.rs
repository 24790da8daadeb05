//! Thin client for the hosted-payment-link gateway. The gateway is an
//! opaque HTTP collaborator; its failures surface as `PaymentGateway`
//! errors carrying the upstream message when one is available.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;

#[derive(Clone)]
pub struct PaymentClient {
    client: Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentLinkRequest {
    pub amount_cents: i64,
    pub currency: String,
    /// Registration id, echoed back by the webhook.
    pub reference: String,
    pub return_url: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentLink {
    pub id: String,
    pub url: String,
}

impl PaymentClient {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }

    pub async fn create_payment_link(
        &self,
        request: &PaymentLinkRequest,
    ) -> Result<PaymentLink, AppError> {
        let response = self
            .client
            .post(format!("{}/payment_links", self.api_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::PaymentGateway(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                format!("gateway returned {status}")
            } else {
                body
            };
            return Err(AppError::PaymentGateway(message));
        }

        response
            .json::<PaymentLink>()
            .await
            .map_err(|e| AppError::PaymentGateway(format!("unreadable gateway response: {e}")))
    }
}
