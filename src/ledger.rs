//! Append-only intake ledger and the same-day aggregations over it.
//!
//! Quantities are rounded half away from zero (`f64::round`). Every value
//! rounded here is non-negative, so this is round-half-up.

use crate::errors::LedgerError;
use crate::models::{GoalProgress, IntakeRecord, LeaderboardEntry, Ounces};
use crate::storage::RecordStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

const KG_PER_HALF_OUNCE_STEP: f64 = 20.0;
const OUNCES_PER_LITRE: f64 = 33.814;

/// Daily goal in whole ounces for a body weight in kilograms.
pub fn compute_goal(weight_kg: f64) -> Result<u32, LedgerError> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(LedgerError::invalid(format!(
            "weight must be a positive number of kilograms, got {weight_kg}"
        )));
    }
    Ok(((weight_kg / KG_PER_HALF_OUNCE_STEP) * OUNCES_PER_LITRE).round() as u32)
}

pub fn percentage(ratio: f64) -> u32 {
    (ratio * 100.0).round() as u32
}

pub fn daily_total_in(records: &[IntakeRecord], user: &str, date: NaiveDate) -> Ounces {
    records
        .iter()
        .filter(|record| record.user == user && record.date == date)
        .map(|record| record.amount)
        .sum()
}

/// Largest goal a user logged against on `date`, if they logged anything.
pub fn day_goal_in(records: &[IntakeRecord], user: &str, date: NaiveDate) -> Option<Ounces> {
    records
        .iter()
        .filter(|record| record.user == user && record.date == date)
        .map(|record| record.goal)
        .reduce(f64::max)
}

pub fn progress_of(total: Ounces, goal: Option<Ounces>) -> GoalProgress {
    match goal.filter(|goal| *goal > 0.0) {
        Some(goal) => {
            let ratio = total / goal;
            GoalProgress {
                total,
                goal,
                ratio,
                fraction: ratio.min(1.0),
                percentage: percentage(ratio),
            }
        }
        None => GoalProgress {
            total,
            goal: 0.0,
            ratio: 0.0,
            fraction: 0.0,
            percentage: 0,
        },
    }
}

/// Ranks every user with rows on `date`. Equal percentages fall back to the
/// uncapped ratio, then to the user name.
pub fn leaderboard_in(records: &[IntakeRecord], date: NaiveDate) -> Vec<LeaderboardEntry> {
    let mut groups: BTreeMap<&str, (Ounces, Ounces)> = BTreeMap::new();
    for record in records.iter().filter(|record| record.date == date) {
        let entry = groups.entry(record.user.as_str()).or_insert((0.0, 0.0));
        entry.0 += record.amount;
        entry.1 = entry.1.max(record.goal);
    }

    let mut entries: Vec<LeaderboardEntry> = groups
        .into_iter()
        .map(|(user, (total, goal))| {
            let ratio = total / goal;
            LeaderboardEntry {
                rank: 0,
                user: user.to_string(),
                percentage: percentage(ratio),
                total,
                goal,
                ratio,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.percentage
            .cmp(&a.percentage)
            .then_with(|| b.ratio.total_cmp(&a.ratio))
    });
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx + 1;
    }
    entries
}

/// The ledger over whichever store the caller hands it.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn RecordStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn append(
        &self,
        date: NaiveDate,
        user: &str,
        amount: Ounces,
        goal: Ounces,
    ) -> Result<(), LedgerError> {
        let record = IntakeRecord::new(date, user, amount, goal)?;
        info!(%date, user = %record.user, amount, goal, "logging intake");
        self.store.append(record).await
    }

    /// Every stored row, or none when the store cannot be read.
    pub async fn records(&self) -> Vec<IntakeRecord> {
        match self.store.read_all().await {
            Ok(records) => records,
            Err(err) => {
                warn!("reading intake table failed, treating as empty: {err}");
                Vec::new()
            }
        }
    }

    pub async fn daily_total(&self, user: &str, date: NaiveDate) -> Ounces {
        daily_total_in(&self.records().await, user.trim(), date)
    }

    pub async fn leaderboard(&self, date: NaiveDate) -> Vec<LeaderboardEntry> {
        leaderboard_in(&self.records().await, date)
    }

    /// Progress against `goal` when given, otherwise against the day's
    /// largest logged goal.
    pub async fn progress(&self, user: &str, date: NaiveDate, goal: Option<Ounces>) -> GoalProgress {
        let records = self.records().await;
        let user = user.trim();
        let total = daily_total_in(&records, user, date);
        progress_of(total, goal.or_else(|| day_goal_in(&records, user, date)))
    }
}
