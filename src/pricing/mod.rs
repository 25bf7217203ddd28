//! Price reconciliation: staleness decisions, refetching, trend classification
//! and fan-out of refreshed prices to every owned record.

pub mod reconcile;
pub mod trend;

pub use reconcile::{PriceLookup, PriceReconciler};
pub use trend::{compute_trend, PriceChange, Trend};
