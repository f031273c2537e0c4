use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::error::{HabitError, Result};
use crate::validate;

/// Free-text annotation on a habit. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    #[serde(skip_serializing, default)]
    pub habit_id: i64,
    pub text: String,
    pub date: NaiveDate,
    #[serde(skip_serializing, default)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteInput {
    pub text: Option<String>,
}

impl NoteInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// Returns the trimmed note text.
    pub fn validate(&self) -> Result<String> {
        validate::required_text("text", self.text.as_deref(), "note text is required")
    }
}

impl Note {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            habit_id: row.get("habit_id")?,
            text: row.get("text")?,
            date: row.get("date")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Inserts a note dated on the UTC day of `created_at`.
    pub fn insert(
        conn: &Connection,
        habit_id: i64,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let date = created_at.date_naive();
        conn.execute(
            "INSERT INTO notes (habit_id, text, date, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![habit_id, text, date, created_at],
        )
        .map_err(HabitError::from_write)?;

        Ok(Self {
            id: conn.last_insert_rowid(),
            habit_id,
            text: text.to_string(),
            date,
            created_at,
        })
    }

    pub fn list_by_habit(conn: &Connection, habit_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, text, date, created_at FROM notes
             WHERE habit_id = ?1 ORDER BY id",
        )?;
        let notes = stmt
            .query_map([habit_id], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(notes)
    }
}
