//! Server response for cost estimation.

use serde::{Deserialize, Serialize};

/// Result of `POST /estimate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Instance type the estimate is priced for
    pub instance_type: String,

    /// Hourly rate for that instance in USD
    pub hourly_rate_usd: f64,

    /// Assumed training duration in hours
    pub estimated_hours: f64,

    /// Total projected cost in USD, rounded to cents
    pub estimated_cost_usd: f64,
}
