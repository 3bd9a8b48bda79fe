pub use filter::{by_region, mutual_funds, stocks, unique_names};
pub use metrics::{DerivedMetrics, PositionMetrics, derive};

mod filter;
mod metrics;
