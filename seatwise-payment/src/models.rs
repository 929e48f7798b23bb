use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local lifecycle of a persisted payment record. A refunded payment no
/// longer represents money held, so refunds delete the record instead of
/// adding a third state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

/// Audit record of a payment intent, keyed by the processor's intent id.
/// Amounts are stored as exact minor-unit integers; major-unit numbers only
/// appear at the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub booking_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Major-unit view for response bodies.
    pub fn amount_major(&self) -> f64 {
        self.amount_minor as f64 / 100.0
    }
}
