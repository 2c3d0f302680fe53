use crate::ledger::{daily_total_in, day_goal_in, progress_of};
use crate::models::{DailyProgress, History, IntakeRecord, Ounces};
use chrono::{Duration, NaiveDate};

pub fn build_history(
    records: &[IntakeRecord],
    user: &str,
    today: NaiveDate,
    goal: Option<Ounces>,
) -> History {
    let user = user.trim();

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        last_7_days.push(day_progress(records, user, date, goal));
    }

    History {
        user: user.to_string(),
        last_7_days,
        streak: streak(records, user, today, goal),
    }
}

fn day_progress(
    records: &[IntakeRecord],
    user: &str,
    date: NaiveDate,
    goal: Option<Ounces>,
) -> DailyProgress {
    let consumed = daily_total_in(records, user, date);
    let progress = progress_of(consumed, goal.or_else(|| day_goal_in(records, user, date)));
    DailyProgress {
        date: date.to_string(),
        consumed,
        goal: progress.goal,
        percentage: progress.percentage,
        completed: progress.goal > 0.0 && consumed >= progress.goal,
    }
}

/// Consecutive completed days ending today, or ending yesterday while today
/// is still in progress.
fn streak(records: &[IntakeRecord], user: &str, today: NaiveDate, goal: Option<Ounces>) -> u32 {
    let mut date = today;
    if !day_progress(records, user, date, goal).completed {
        date -= Duration::days(1);
    }

    let earliest = records
        .iter()
        .filter(|record| record.user == user)
        .map(|record| record.date)
        .min();
    let Some(earliest) = earliest else {
        return 0;
    };

    let mut count = 0;
    while date >= earliest && day_progress(records, user, date, goal).completed {
        count += 1;
        date -= Duration::days(1);
    }
    count
}
