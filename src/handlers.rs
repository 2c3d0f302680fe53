use crate::errors::{AppError, LedgerError};
use crate::ledger::compute_goal;
use crate::models::{
    DateQuery, GoalResponse, History, LeaderboardResponse, LogIntakeRequest, RosterResponse,
    TodayResponse, UserQuery, WeightQuery,
};
use crate::state::AppState;
use crate::stats::build_history;
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde_json::Value;

const QUICK_AMOUNTS: [u32; 3] = [8, 16, 32];

pub async fn get_roster(State(state): State<AppState>) -> Json<RosterResponse> {
    Json(RosterResponse {
        users: state.roster.as_ref().clone(),
        quick_amounts: QUICK_AMOUNTS.to_vec(),
    })
}

pub async fn get_goal(Query(query): Query<WeightQuery>) -> Result<Json<GoalResponse>, AppError> {
    let goal_oz = compute_goal(query.weight_kg)?;
    Ok(Json(GoalResponse {
        weight_kg: query.weight_kg,
        goal_oz,
    }))
}

pub async fn get_today(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<TodayResponse>, AppError> {
    let user = required_user(&query.user)?;
    let goal = optional_goal(query.weight_kg)?;
    Ok(Json(today_response(&state, user, today(), goal).await))
}

pub async fn log_intake(
    State(state): State<AppState>,
    Json(payload): Json<LogIntakeRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let amount = parse_amount(&payload.amount)?;
    let goal = f64::from(compute_goal(payload.weight_kg)?);
    let date = today();

    state.ledger.append(date, &payload.user, amount, goal).await?;

    Ok(Json(today_response(&state, payload.user.trim(), date, Some(goal)).await))
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Json<LeaderboardResponse> {
    let date = query.date.unwrap_or_else(today);
    let entries = state.ledger.leaderboard(date).await;
    Json(LeaderboardResponse {
        date: date.to_string(),
        entries,
    })
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<History>, AppError> {
    let user = required_user(&query.user)?;
    let goal = optional_goal(query.weight_kg)?;
    let records = state.ledger.records().await;
    Ok(Json(build_history(&records, user, today(), goal)))
}

async fn today_response(
    state: &AppState,
    user: &str,
    date: NaiveDate,
    goal: Option<f64>,
) -> TodayResponse {
    let progress = state.ledger.progress(user, date, goal).await;
    TodayResponse {
        date: date.to_string(),
        user: user.to_string(),
        total: progress.total,
        goal: progress.goal,
        fraction: progress.fraction,
        percentage: progress.percentage,
    }
}

fn required_user(user: &str) -> Result<&str, LedgerError> {
    let user = user.trim();
    if user.is_empty() {
        return Err(LedgerError::invalid("user must not be empty"));
    }
    Ok(user)
}

fn optional_goal(weight_kg: Option<f64>) -> Result<Option<f64>, LedgerError> {
    weight_kg
        .map(|weight| compute_goal(weight).map(f64::from))
        .transpose()
}

/// Accepts a JSON number or a numeric string, as form posts send strings.
fn parse_amount(value: &Value) -> Result<f64, LedgerError> {
    let amount = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match amount {
        Some(amount) if amount.is_finite() => Ok(amount),
        _ => Err(LedgerError::invalid(format!("amount must be numeric, got {value}"))),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
