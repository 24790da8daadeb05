pub mod discount;
pub mod resolver;
pub mod rounding;

pub use discount::{best_discount, AppliedDiscount};
pub use resolver::{resolve_price, PriceQuote, PriceSource, PricingInputs};
pub use rounding::psych_round;
