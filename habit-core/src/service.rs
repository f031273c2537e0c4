//! Habit operations.
//!
//! Every operation validates its input before touching storage, and every
//! mutation runs in a single transaction.

use chrono::{NaiveDate, Utc};

use crate::db::Database;
use crate::error::{HabitError, Result};
use crate::models::*;

#[derive(Clone)]
pub struct HabitService {
    db: Database,
}

impl HabitService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn list_habits(&self, filter: &HabitFilter) -> Result<Vec<Habit>> {
        self.db.with_connection(|conn| Habit::list(conn, filter))
    }

    pub fn get_habit(&self, id: i64) -> Result<Habit> {
        self.db
            .with_connection(|conn| Habit::find_by_id(conn, id))?
            .ok_or(HabitError::NotFound(id))
    }

    pub fn create_habit(&self, input: &HabitInput) -> Result<Habit> {
        let new = input.validate_new()?;
        let habit = self
            .db
            .with_transaction(|tx| Habit::insert(tx, &new, Utc::now()))?;
        tracing::debug!(habit_id = habit.id, name = %habit.name, "Created habit");
        Ok(habit)
    }

    /// Full update: the payload must be a complete habit definition.
    pub fn replace_habit(&self, id: i64, input: &HabitInput) -> Result<Habit> {
        let new = input.validate_new()?;
        self.write_habit(id, |_| new)
    }

    /// Partial update: only the fields present in the payload change.
    pub fn patch_habit(&self, id: i64, input: &HabitInput) -> Result<Habit> {
        let changes = input.validate_changes()?;
        self.write_habit(id, |current| changes.apply_to(current))
    }

    fn write_habit(&self, id: i64, build: impl FnOnce(&Habit) -> NewHabit) -> Result<Habit> {
        let habit = self.db.with_transaction(|tx| {
            let current = Habit::find_by_id(tx, id)?.ok_or(HabitError::NotFound(id))?;
            let next = build(&current);
            Habit::update(tx, id, &next)?;
            Habit::find_by_id(tx, id)?.ok_or(HabitError::NotFound(id))
        })?;
        tracing::debug!(habit_id = id, "Updated habit");
        Ok(habit)
    }

    /// Removes the habit with all of its check-ins and notes.
    pub fn delete_habit(&self, id: i64) -> Result<()> {
        let deleted = self.db.with_transaction(|tx| Habit::delete(tx, id))?;
        if !deleted {
            return Err(HabitError::NotFound(id));
        }
        tracing::debug!(habit_id = id, "Deleted habit");
        Ok(())
    }

    /// Creates the check-in for `(habit_id, date)` if absent, removes it if
    /// present. Two calls in a row leave the habit as it was.
    pub fn toggle_checkin(&self, habit_id: i64, input: &CheckInInput) -> Result<CheckInToggle> {
        let date = input.validate()?;

        match self.try_toggle(habit_id, date) {
            // Another writer created the row between our read and insert.
            // Re-read and toggle against what is there now.
            Err(HabitError::ConstraintViolation(reason)) => {
                tracing::warn!(habit_id, %date, %reason, "Check-in race detected, retrying once");
                self.try_toggle(habit_id, date)
            }
            other => other,
        }
    }

    fn try_toggle(&self, habit_id: i64, date: NaiveDate) -> Result<CheckInToggle> {
        let toggle = self.db.with_transaction(|tx| {
            if !Habit::exists(tx, habit_id)? {
                return Err(HabitError::NotFound(habit_id));
            }
            match CheckIn::find(tx, habit_id, date)? {
                Some(existing) => {
                    CheckIn::delete(tx, existing.id)?;
                    Ok(CheckInToggle::Removed)
                }
                None => CheckIn::insert(tx, habit_id, date).map(CheckInToggle::Created),
            }
        })?;
        tracing::debug!(habit_id, %date, checked = toggle.is_checked(), "Toggled check-in");
        Ok(toggle)
    }

    pub fn add_note(&self, habit_id: i64, input: &NoteInput) -> Result<Note> {
        let text = input.validate()?;
        let note = self.db.with_transaction(|tx| {
            if !Habit::exists(tx, habit_id)? {
                return Err(HabitError::NotFound(habit_id));
            }
            Note::insert(tx, habit_id, &text, Utc::now())
        })?;
        tracing::debug!(habit_id, note_id = note.id, "Added note");
        Ok(note)
    }

    pub fn habit_stats(&self, habit_id: i64, today: NaiveDate) -> Result<HabitStats> {
        let habit = self.get_habit(habit_id)?;
        Ok(HabitStats::compute(&habit, today))
    }
}
