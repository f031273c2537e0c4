use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::Habit;

/// Progress figures derived from a habit's check-ins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitStats {
    pub habit_id: i64,
    /// Consecutive days with a check-in, counting back from today.
    pub current_streak: u32,
    /// Check-ins per elapsed day since the start date, as a rounded percentage.
    pub success_rate: u32,
    /// Weekday with the most check-ins, e.g. "Monday".
    pub best_day: Option<String>,
    pub total_checkins: usize,
}

impl HabitStats {
    pub fn compute(habit: &Habit, today: NaiveDate) -> Self {
        let mut dates: Vec<NaiveDate> = habit
            .checkins
            .iter()
            .map(|c| c.date)
            .filter(|d| *d <= today)
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));

        Self {
            habit_id: habit.id,
            current_streak: current_streak(&dates, today),
            success_rate: success_rate(habit.checkins.len(), habit.start_date, today),
            best_day: best_day(habit.checkins.iter().map(|c| c.date)),
            total_checkins: habit.checkins.len(),
        }
    }
}

/// `newest_first` must be sorted descending with no dates after `today`.
fn current_streak(newest_first: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut expected = today;
    let mut streak = 0;
    for date in newest_first {
        if *date != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    streak
}

fn success_rate(checkins: usize, start_date: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - start_date).num_days() + 1;
    if days <= 0 {
        return 0;
    }
    (checkins as f64 / days as f64 * 100.0).round() as u32
}

fn best_day(dates: impl Iterator<Item = NaiveDate>) -> Option<String> {
    let mut counts = [0usize; 7];
    for date in dates {
        counts[date.weekday().num_days_from_monday() as usize] += 1;
    }

    // max_by_key keeps the last maximum, so scan in reverse to favour Monday.
    let (index, count) = counts
        .iter()
        .enumerate()
        .rev()
        .max_by_key(|(_, count)| **count)?;
    if *count == 0 {
        return None;
    }
    let weekday = Weekday::try_from(index as u8).ok()?;
    Some(weekday_name(weekday).to_string())
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
