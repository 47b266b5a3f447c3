use std::sync::Arc;

use super::catalog::{BadgeLevel, BadgeType, Catalog, ScoreCategory};
use super::domain::CustomerId;
use super::repository::{BadgeRepository, CategoryHistoryRepository, RepositoryError};

/// Scoring events needed to unlock each badge level.
pub const LEVEL_THRESHOLDS: [(BadgeLevel, u32); 3] = [(1, 1), (2, 3), (3, 6)];

/// Decides which badges a scoring event newly earns. Persisting them is the caller's job.
#[derive(Clone)]
pub struct BadgeTierResolver {
    catalog: Arc<Catalog>,
    history: Arc<dyn CategoryHistoryRepository>,
    badges: Arc<dyn BadgeRepository>,
}

impl BadgeTierResolver {
    pub fn new(
        catalog: Arc<Catalog>,
        history: Arc<dyn CategoryHistoryRepository>,
        badges: Arc<dyn BadgeRepository>,
    ) -> Self {
        Self {
            catalog,
            history,
            badges,
        }
    }

    /// Badges earned by reaching `score_count` scoring events in `category`,
    /// followed by any `All` badges the customer now qualifies for.
    ///
    /// The `All` family is only re-evaluated when a category badge was produced.
    pub fn resolve(
        &self,
        customer_id: &CustomerId,
        category: ScoreCategory,
        score_count: u32,
    ) -> Result<Vec<BadgeType>, RepositoryError> {
        let owned = self.badges_in_category(customer_id, category)?;
        let mut earned = self.unlocked(category, score_count, &owned);

        if earned.is_empty() {
            return Ok(earned);
        }

        let owned_all = self.badges_in_category(customer_id, ScoreCategory::All)?;
        let history = self.history.get_all(customer_id)?;

        let min_scored = if history.len() == ScoreCategory::PRIMARY.len() {
            history
                .iter()
                .map(|row| row.times_scored)
                .min()
                .unwrap_or(0)
        } else {
            0
        };

        earned.extend(self.unlocked(ScoreCategory::All, min_scored, &owned_all));
        Ok(earned)
    }

    /// Badges the customer holds in `category`, freshly read from storage.
    pub fn badges_in_category(
        &self,
        customer_id: &CustomerId,
        category: ScoreCategory,
    ) -> Result<Vec<BadgeType>, RepositoryError> {
        self.owned(customer_id, |badge| badge.category == category)
    }

    pub fn all_badges(&self, customer_id: &CustomerId) -> Result<Vec<BadgeType>, RepositoryError> {
        self.owned(customer_id, |_| true)
    }

    fn owned(
        &self,
        customer_id: &CustomerId,
        predicate: impl Fn(&BadgeType) -> bool,
    ) -> Result<Vec<BadgeType>, RepositoryError> {
        let awards = self.badges.get(customer_id)?;
        Ok(awards
            .iter()
            .filter_map(|award| self.catalog.badge(&award.badge_code))
            .filter(|badge| predicate(badge))
            .collect())
    }

    fn unlocked(
        &self,
        category: ScoreCategory,
        count: u32,
        owned: &[BadgeType],
    ) -> Vec<BadgeType> {
        LEVEL_THRESHOLDS
            .iter()
            .filter(|(_, threshold)| count >= *threshold)
            .filter_map(|(level, _)| self.catalog.badge_for(category, *level))
            .filter(|badge| !has_badge(owned, badge))
            .collect()
    }
}

fn has_badge(owned: &[BadgeType], badge: &BadgeType) -> bool {
    owned.iter().any(|held| held.code == badge.code)
}
