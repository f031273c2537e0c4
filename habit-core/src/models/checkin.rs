use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::error::{HabitError, Result};
use crate::validate;

/// A habit marked as done on a given day. At most one per habit per day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckIn {
    pub id: i64,
    #[serde(skip_serializing, default)]
    pub habit_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckInInput {
    pub date: Option<String>,
}

impl CheckInInput {
    pub fn for_date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
        }
    }

    pub fn validate(&self) -> Result<NaiveDate> {
        let raw = validate::required_text("date", self.date.as_deref(), "date is required")?;
        validate::parse_date("date", &raw)
    }
}

/// Outcome of toggling a check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInToggle {
    Created(CheckIn),
    Removed,
}

impl CheckInToggle {
    pub fn is_checked(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

impl CheckIn {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            habit_id: row.get("habit_id")?,
            date: row.get("date")?,
        })
    }

    /// Inserts a check-in. A second check-in for the same habit and day fails
    /// with [`HabitError::ConstraintViolation`].
    pub fn insert(conn: &Connection, habit_id: i64, date: NaiveDate) -> Result<Self> {
        conn.execute(
            "INSERT INTO checkins (habit_id, date) VALUES (?1, ?2)",
            params![habit_id, date],
        )
        .map_err(HabitError::from_write)?;

        Ok(Self {
            id: conn.last_insert_rowid(),
            habit_id,
            date,
        })
    }

    pub fn find(conn: &Connection, habit_id: i64, date: NaiveDate) -> Result<Option<Self>> {
        let checkin = conn
            .query_row(
                "SELECT id, habit_id, date FROM checkins WHERE habit_id = ?1 AND date = ?2",
                params![habit_id, date],
                Self::from_row,
            )
            .optional()?;
        Ok(checkin)
    }

    pub fn list_by_habit(conn: &Connection, habit_id: i64) -> Result<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT id, habit_id, date FROM checkins WHERE habit_id = ?1 ORDER BY id")?;
        let checkins = stmt
            .query_map([habit_id], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(checkins)
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM checkins WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    pub fn count_by_habit(conn: &Connection, habit_id: i64) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM checkins WHERE habit_id = ?1",
            [habit_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
