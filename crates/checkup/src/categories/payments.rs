use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProviderError;
use crate::engagement::CustomerId;

/// Payment-like item shown for direct debits, standing orders and incomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub recipient_id: i64,
    pub recipient_name: String,
    /// RFC 3339 timestamp on the wire.
    pub due_date: DateTime<Utc>,
    pub frequency: Frequency,
    pub amount_pence: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Fortnightly,
    Monthly,
    Quarterly,
    Annually,
}

/// Upstream source of a customer's payments for one category.
pub trait PaymentProvider: Send + Sync {
    fn list(&self, customer_id: &CustomerId) -> Result<Vec<Payment>, ProviderError>;
    fn update(&self, customer_id: &CustomerId, payment: Payment) -> Result<(), ProviderError>;
}
