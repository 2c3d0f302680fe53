use crate::errors::LedgerError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ounces of water. Amounts and goals share the unit.
pub type Ounces = f64;

/// One logged drink. Rows are never edited once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "Intake")]
    pub amount: Ounces,
    #[serde(rename = "Goal")]
    pub goal: Ounces,
}

impl IntakeRecord {
    /// Builds a record, trimming the user name and rejecting amounts below
    /// zero, goals not above zero, and non-finite quantities.
    pub fn new(
        date: NaiveDate,
        user: &str,
        amount: Ounces,
        goal: Ounces,
    ) -> Result<Self, LedgerError> {
        let record = Self {
            date,
            user: user.trim().to_string(),
            amount,
            goal,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.user.trim().is_empty() {
            return Err(LedgerError::invalid("user must not be empty"));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(LedgerError::invalid(format!(
                "amount must be a non-negative number, got {}",
                self.amount
            )));
        }
        if !self.goal.is_finite() || self.goal <= 0.0 {
            return Err(LedgerError::invalid(format!(
                "goal must be positive, got {}",
                self.goal
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub total: Ounces,
    pub goal: Ounces,
    /// Uncapped total / goal.
    pub ratio: f64,
    /// `ratio` capped at 1.0 for progress bars.
    pub fraction: f64,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user: String,
    pub percentage: u32,
    pub total: Ounces,
    pub goal: Ounces,
    #[serde(skip)]
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProgress {
    pub date: String,
    pub consumed: Ounces,
    pub goal: Ounces,
    pub percentage: u32,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct History {
    pub user: String,
    pub last_7_days: Vec<DailyProgress>,
    pub streak: u32,
}

#[derive(Debug, Deserialize)]
pub struct LogIntakeRequest {
    pub user: String,
    /// Number or numeric string; validated by the handler.
    pub amount: serde_json::Value,
    pub weight_kg: f64,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: String,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct WeightQuery {
    pub weight_kg: f64,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub date: String,
    pub user: String,
    pub total: Ounces,
    pub goal: Ounces,
    pub fraction: f64,
    pub percentage: u32,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub weight_kg: f64,
    pub goal_oz: u32,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub date: String,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub users: Vec<String>,
    pub quick_amounts: Vec<u32>,
}
