use chrono::{DateTime, Utc};
use serde::Serialize;

use super::badges::BadgeTierResolver;
use super::catalog::{BadgeType, ScoreCategory};
use super::confirmation::EngagementError;
use super::domain::{CategoryHistory, CustomerId};
use super::repository::Repositories;

/// Where a score sits among every customer's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRank {
    pub position: usize,
    pub is_joint_position: bool,
    pub points_behind_next: i64,
}

/// `position` is one more than the number of strictly higher totals. The tie counter includes
/// the customer's own entry when it is part of `totals`.
pub fn rank(score: i64, totals: &[i64]) -> LeaderboardRank {
    let mut position = 1;
    let mut equal = 0;
    let mut next_above: Option<i64> = None;

    for &total in totals {
        if total > score {
            position += 1;
            next_above = Some(next_above.map_or(total, |current| current.min(total)));
        } else if total == score {
            equal += 1;
        }
    }

    LeaderboardRank {
        position,
        is_joint_position: equal > 1,
        points_behind_next: next_above.map_or(0, |above| above - score),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCategoryScore {
    pub category: ScoreCategory,
    pub last_confirmed_date_time: DateTime<Utc>,
    pub last_scored_date_time: DateTime<Utc>,
    pub confirmation_count: u32,
    pub score_count: u32,
}

impl From<CategoryHistory> for UserCategoryScore {
    fn from(history: CategoryHistory) -> Self {
        Self {
            category: history.category,
            last_confirmed_date_time: history.last_confirmed,
            last_scored_date_time: history.last_scored,
            confirmation_count: history.times_confirmed,
            score_count: history.times_scored,
        }
    }
}

/// Score, rank, per-category history and badges for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScoreSummary {
    #[serde(rename = "customerCIF")]
    pub customer_id: CustomerId,
    pub score: i64,
    pub position: usize,
    pub is_joint_position: bool,
    pub points_behind_next: i64,
    pub categories: Vec<UserCategoryScore>,
    pub badges: Vec<BadgeType>,
}

#[derive(Clone)]
pub struct LeaderboardRanker {
    repositories: Repositories,
    resolver: BadgeTierResolver,
}

impl LeaderboardRanker {
    pub fn new(repositories: Repositories, resolver: BadgeTierResolver) -> Self {
        Self {
            repositories,
            resolver,
        }
    }

    pub fn score_summary(
        &self,
        customer_id: &CustomerId,
    ) -> Result<UserScoreSummary, EngagementError> {
        let score = self
            .repositories
            .scores
            .get(customer_id)?
            .map_or(0, |record| record.total_score);
        let totals = self.repositories.scores.all_totals()?;
        let history = self.repositories.history.get_all(customer_id)?;
        let badges = self.resolver.all_badges(customer_id)?;

        let LeaderboardRank {
            position,
            is_joint_position,
            points_behind_next,
        } = rank(score, &totals);

        Ok(UserScoreSummary {
            customer_id: customer_id.clone(),
            score,
            position,
            is_joint_position,
            points_behind_next,
            categories: history.into_iter().map(UserCategoryScore::from).collect(),
            badges,
        })
    }
}
