use axum::extract::{FromRef, State};
use axum::routing::get;
use axum::{Json, Router};

use super::leaderboard::{LeaderboardRanker, UserScoreSummary};
use crate::auth::{ApiContext, AuthenticatedCustomer};
use crate::error::ApiError;

#[derive(Clone)]
pub(crate) struct ScoreRouteState {
    pub(crate) ranker: LeaderboardRanker,
    pub(crate) context: ApiContext,
}

impl FromRef<ScoreRouteState> for ApiContext {
    fn from_ref(state: &ScoreRouteState) -> Self {
        state.context.clone()
    }
}

/// Router exposing the customer's score and leaderboard position.
pub fn score_router(ranker: LeaderboardRanker, context: ApiContext) -> Router {
    Router::new()
        .route("/api/v1/score", get(score_handler))
        .with_state(ScoreRouteState { ranker, context })
}

pub(crate) async fn score_handler(
    State(state): State<ScoreRouteState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<Json<UserScoreSummary>, ApiError> {
    state
        .ranker
        .score_summary(&customer)
        .map(Json)
        .map_err(|err| state.context.fail(err))
}
