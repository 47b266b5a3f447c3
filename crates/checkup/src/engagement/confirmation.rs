use std::sync::Arc;

use tracing::{info, warn};

use super::badges::BadgeTierResolver;
use super::catalog::{Catalog, ScoreCategory};
use super::clock::{add_one_month, Clock};
use super::domain::{
    BadgeAward, CategoryHistory, CategoryStatus, ConfirmationOutcome, CustomerId, CustomerScore,
    POINTS_PER_SCORING_EVENT,
};
use super::repository::{Repositories, RepositoryError};

/// Records confirmations, grants points outside the monthly cooldown, and awards badges.
///
/// Writes are sequential and not transactional: history first, then the score, then each
/// badge. The first failure aborts and nothing already written is rolled back.
#[derive(Clone)]
pub struct ConfirmationEngine {
    repositories: Repositories,
    resolver: BadgeTierResolver,
    clock: Arc<dyn Clock>,
}

impl ConfirmationEngine {
    pub fn new(catalog: Arc<Catalog>, repositories: Repositories, clock: Arc<dyn Clock>) -> Self {
        let resolver = BadgeTierResolver::new(
            catalog,
            repositories.history.clone(),
            repositories.badges.clone(),
        );

        Self {
            repositories,
            resolver,
            clock,
        }
    }

    pub fn resolver(&self) -> &BadgeTierResolver {
        &self.resolver
    }

    /// Record that the customer reviewed `category`.
    pub fn confirm_category(
        &self,
        customer_id: &CustomerId,
        category: ScoreCategory,
    ) -> Result<ConfirmationOutcome, EngagementError> {
        if !category.is_primary() {
            return Err(EngagementError::NotConfirmable(category));
        }

        self.apply_confirmation(customer_id, category)
            .map_err(|err| {
                warn!(
                    customer = %customer_id,
                    category = %category,
                    error = %err,
                    "confirmation aborted"
                );
                err
            })
    }

    fn apply_confirmation(
        &self,
        customer_id: &CustomerId,
        category: ScoreCategory,
    ) -> Result<ConfirmationOutcome, EngagementError> {
        let now = self.clock.now();

        let mut score = self
            .repositories
            .scores
            .get(customer_id)?
            .unwrap_or_else(|| CustomerScore::empty(customer_id.clone()));

        let mut history = self
            .repositories
            .history
            .get(customer_id, category)?
            .unwrap_or_else(|| CategoryHistory::empty(customer_id.clone(), category));

        let mut points_gained = 0;
        if add_one_month(history.last_scored) < now {
            points_gained = POINTS_PER_SCORING_EVENT;
            score.total_score += points_gained;
            history.last_scored = now;
            history.times_scored += 1;
        }

        history.last_confirmed = now;
        history.times_confirmed += 1;

        let next_eligible_at = add_one_month(history.last_scored);
        let times_scored = history.times_scored;
        self.repositories.history.put(history)?;

        let mut new_badges = Vec::new();
        if points_gained > 0 {
            self.repositories.scores.put(score)?;

            new_badges = self.resolver.resolve(customer_id, category, times_scored)?;
            for badge in &new_badges {
                self.repositories.badges.put(BadgeAward {
                    customer_id: customer_id.clone(),
                    badge_code: badge.code.to_string(),
                    date_awarded: now,
                })?;
            }
        }

        info!(
            customer = %customer_id,
            category = %category,
            points_gained,
            badges = ?new_badges.iter().map(|badge| badge.code).collect::<Vec<_>>(),
            "category confirmed"
        );

        Ok(ConfirmationOutcome {
            points_gained,
            next_eligible_at,
            new_badges,
        })
    }

    /// Stored confirmation state for a category; never writes.
    pub fn category_status(
        &self,
        customer_id: &CustomerId,
        category: ScoreCategory,
    ) -> Result<CategoryStatus, EngagementError> {
        let Some(history) = self.repositories.history.get(customer_id, category)? else {
            let empty = CategoryHistory::empty(customer_id.clone(), category);
            return Ok(CategoryStatus {
                last_confirmed: empty.last_confirmed,
                last_scored: empty.last_scored,
                badges: Vec::new(),
            });
        };

        let badges = self.resolver.badges_in_category(customer_id, category)?;
        Ok(CategoryStatus {
            last_confirmed: history.last_confirmed,
            last_scored: history.last_scored,
            badges,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngagementError {
    #[error("category {0} cannot be confirmed directly")]
    NotConfirmable(ScoreCategory),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
