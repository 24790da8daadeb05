pub mod events;
pub mod pricing;
