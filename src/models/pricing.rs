use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_BUFFER_BPS: i64 = 150;

/// FX rate row for one base currency. Refreshed by an external job; a
/// missing target rate is an expected state, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FxRates {
    pub base_currency: String,
    pub rates: Json<HashMap<String, f64>>,
    pub updated_at: DateTime<Utc>,
}

impl FxRates {
    pub fn rate_for(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied().filter(|r| *r > 0.0)
    }
}

/// Singleton configuration row for the pricing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PricingSettings {
    pub id: Uuid,
    pub buffer_bps: Option<i32>,
    pub supported: Vec<String>,
    pub cny_rounding: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnyRounding {
    /// Round to the nearest whole yuan (100 minor units).
    Yuan,
    /// Round to the nearest 50 minor units.
    Half,
}

impl PricingSettings {
    pub fn buffer_bps(&self) -> i64 {
        self.buffer_bps.map(i64::from).unwrap_or(DEFAULT_BUFFER_BPS)
    }

    pub fn cny_rounding(&self) -> CnyRounding {
        if self.cny_rounding == "half" {
            CnyRounding::Half
        } else {
            CnyRounding::Yuan
        }
    }

    /// Normalize a requested currency: uppercase, and replace anything
    /// outside the supported list with the first supported currency.
    pub fn normalize_currency(&self, requested: &str) -> String {
        let upper = requested.trim().to_uppercase();
        if self.supported.iter().any(|c| c == &upper) {
            upper
        } else {
            self.supported
                .first()
                .cloned()
                .unwrap_or_else(|| "USD".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(supported: &[&str]) -> PricingSettings {
        PricingSettings {
            id: Uuid::new_v4(),
            buffer_bps: None,
            supported: supported.iter().map(|s| s.to_string()).collect(),
            cny_rounding: "yuan".to_string(),
        }
    }

    #[test]
    fn normalize_uppercases_supported_currency() {
        let s = settings(&["USD", "EUR"]);
        assert_eq!(s.normalize_currency("eur"), "EUR");
    }

    #[test]
    fn normalize_falls_back_to_first_supported() {
        let s = settings(&["USD", "EUR"]);
        assert_eq!(s.normalize_currency("JPY"), "USD");
    }

    #[test]
    fn buffer_defaults_to_150_bps() {
        let s = settings(&["USD"]);
        assert_eq!(s.buffer_bps(), 150);
    }
}
