use std::sync::Arc;

use super::catalog::ScoreCategory;
use super::domain::{BadgeAward, CategoryHistory, CustomerId, CustomerScore};

/// Per-customer running totals.
pub trait ScoreRepository: Send + Sync {
    fn get(&self, customer_id: &CustomerId) -> Result<Option<CustomerScore>, RepositoryError>;
    fn put(&self, score: CustomerScore) -> Result<(), RepositoryError>;
    /// Total score of every customer, in no particular order.
    fn all_totals(&self) -> Result<Vec<i64>, RepositoryError>;
}

/// Confirmation history keyed by (customer, category).
pub trait CategoryHistoryRepository: Send + Sync {
    fn get(
        &self,
        customer_id: &CustomerId,
        category: ScoreCategory,
    ) -> Result<Option<CategoryHistory>, RepositoryError>;
    fn get_all(&self, customer_id: &CustomerId) -> Result<Vec<CategoryHistory>, RepositoryError>;
    fn put(&self, history: CategoryHistory) -> Result<(), RepositoryError>;
}

/// Badge awards, at most one per (customer, badge code).
pub trait BadgeRepository: Send + Sync {
    fn get(&self, customer_id: &CustomerId) -> Result<Vec<BadgeAward>, RepositoryError>;
    fn put(&self, award: BadgeAward) -> Result<(), RepositoryError>;
}

/// Storage failure. Absence is never an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// The three stores the engine reads and writes, injected as one bundle.
#[derive(Clone)]
pub struct Repositories {
    pub scores: Arc<dyn ScoreRepository>,
    pub history: Arc<dyn CategoryHistoryRepository>,
    pub badges: Arc<dyn BadgeRepository>,
}

impl Repositories {
    pub fn new(
        scores: Arc<dyn ScoreRepository>,
        history: Arc<dyn CategoryHistoryRepository>,
        badges: Arc<dyn BadgeRepository>,
    ) -> Self {
        Self {
            scores,
            history,
            badges,
        }
    }
}
