use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::payments::PaymentClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub payments: PaymentClient,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let payments = PaymentClient::new(
            config.payment_api_url.clone(),
            config.payment_api_key.clone(),
        );
        Self {
            pool,
            config: Arc::new(config),
            payments,
        }
    }
}
