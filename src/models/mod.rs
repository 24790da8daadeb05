pub mod discount;
pub mod event;
pub mod offer;
pub mod pricing;

pub use discount::{Discount, DiscountKind};
pub use event::{EventTicket, Registration};
pub use offer::{BillingType, Offer, PriceOverride};
pub use pricing::{CnyRounding, FxRates, PricingSettings};
