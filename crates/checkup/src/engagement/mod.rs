//! Confirmation and badge-awarding engine.
//!
//! A confirmation is always recorded; it earns points only once the monthly cooldown for that
//! category has passed, and scoring events unlock tiered badges per category plus the
//! cross-category `All` family.

pub mod badges;
pub mod catalog;
pub mod clock;
pub mod confirmation;
pub mod domain;
pub mod leaderboard;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use badges::{BadgeTierResolver, LEVEL_THRESHOLDS};
pub use catalog::{BadgeLevel, BadgeType, Catalog, ScoreCategory, UnknownCategory};
pub use clock::{add_one_month, Clock, FixedClock, SystemClock};
pub use confirmation::{ConfirmationEngine, EngagementError};
pub use domain::{
    BadgeAward, CategoryHistory, CategoryStatus, ConfirmationOutcome, CustomerId, CustomerScore,
    POINTS_PER_SCORING_EVENT,
};
pub use leaderboard::{
    rank, LeaderboardRank, LeaderboardRanker, UserCategoryScore, UserScoreSummary,
};
pub use repository::{
    BadgeRepository, CategoryHistoryRepository, Repositories, RepositoryError, ScoreRepository,
};
pub use router::score_router;
