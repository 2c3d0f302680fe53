use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/roster", get(handlers::get_roster))
        .route("/api/goal", get(handlers::get_goal))
        .route("/api/today", get(handlers::get_today))
        .route("/api/intake", post(handlers::log_intake))
        .route("/api/leaderboard", get(handlers::get_leaderboard))
        .route("/api/stats", get(handlers::get_stats))
        .with_state(state)
}
