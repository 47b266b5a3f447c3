use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{BadgeType, ScoreCategory};

/// Points granted by a single scoring event.
pub const POINTS_PER_SCORING_EVENT: i64 = 100;

/// Opaque customer identifier (the bank's CIF).
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Running total of points for a customer. Only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerScore {
    #[serde(rename = "customerCIF")]
    pub customer_id: CustomerId,
    pub total_score: i64,
}

impl CustomerScore {
    pub fn empty(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            total_score: 0,
        }
    }
}

/// Confirmation bookkeeping for one (customer, category) pair.
///
/// `times_confirmed >= times_scored` holds for every row the engine writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryHistory {
    #[serde(rename = "customerCIF")]
    pub customer_id: CustomerId,
    pub category: ScoreCategory,
    pub last_confirmed: DateTime<Utc>,
    pub last_scored: DateTime<Utc>,
    pub times_confirmed: u32,
    pub times_scored: u32,
}

impl CategoryHistory {
    /// Zero-valued row used when the pair has never been confirmed.
    pub fn empty(customer_id: CustomerId, category: ScoreCategory) -> Self {
        Self {
            customer_id,
            category,
            last_confirmed: DateTime::<Utc>::default(),
            last_scored: DateTime::<Utc>::default(),
            times_confirmed: 0,
            times_scored: 0,
        }
    }
}

/// Write-once record that a customer holds a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeAward {
    #[serde(rename = "customerCIF")]
    pub customer_id: CustomerId,
    pub badge_code: String,
    pub date_awarded: DateTime<Utc>,
}

/// Result of confirming a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationOutcome {
    pub points_gained: i64,
    #[serde(rename = "nextPointsEligible")]
    pub next_eligible_at: DateTime<Utc>,
    pub new_badges: Vec<BadgeType>,
}

/// Read-only view of a category used by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatus {
    pub last_confirmed: DateTime<Utc>,
    pub last_scored: DateTime<Utc>,
    pub badges: Vec<BadgeType>,
}
