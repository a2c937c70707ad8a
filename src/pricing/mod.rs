//! Model pricing and cost estimation
//!
//! Static registry of Gemini models, USD exchange table and the
//! [`CostCalculator`] that combines them with token estimates.

mod calculator;
mod currency;
mod registry;

pub use calculator::{CostCalculator, CostEstimate, format_cost};
pub use currency::{Currency, ExchangeRates};
pub use registry::{PriceEntry, REGISTRY, active_models, price_for};
